use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use directories::ProjectDirs;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::LoadError;
use crate::model::{Answer, Question, Quiz, SessionSummary};

/// Receives the final tally of a completed session.
pub trait ScoreSink {
    fn record(&mut self, summary: &SessionSummary) -> Result<(), LoadError>;
}

/// Identifies which quiz a result belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct QuizMeta {
    pub title: String,
    pub source: String,
    pub hash: String,
}

impl QuizMeta {
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            title: quiz.title.clone(),
            source: quiz.source.clone(),
            hash: quiz.hash.clone(),
        }
    }
}

/// Writes one YAML file per completed session into a results directory.
#[derive(Debug)]
pub struct YamlResultSink {
    dir: PathBuf,
    quiz: QuizMeta,
    written: Option<PathBuf>,
}

impl YamlResultSink {
    pub fn new(dir: impl Into<PathBuf>, quiz: QuizMeta) -> Self {
        Self {
            dir: dir.into(),
            quiz,
            written: None,
        }
    }

    /// Path of the file written by the last successful `record`.
    pub fn written(&self) -> Option<&Path> {
        self.written.as_deref()
    }
}

impl ScoreSink for YamlResultSink {
    fn record(&mut self, summary: &SessionSummary) -> Result<(), LoadError> {
        fs::create_dir_all(&self.dir).map_err(|e| LoadError::io(&self.dir, e))?;

        let finished_at = Local::now();
        let stem = Path::new(&self.quiz.source)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "quiz".to_string());
        let stamp = finished_at.format("%Y%m%d-%H%M%S").to_string();
        let path = unused_path(&self.dir, &stem, &stamp);

        let yaml = build_results_yaml(&self.quiz, summary, &finished_at)?;
        atomic_write(&path, &yaml)?;

        info!(path = %path.display(), score = summary.final_score, "results written");
        self.written = Some(path);
        Ok(())
    }
}

#[derive(Serialize)]
struct ResultsDoc<'a> {
    quiz: QuizBlock<'a>,
    score: ScoreBlock,
    results: Vec<ResultEntry<'a>>,
}

#[derive(Serialize)]
struct QuizBlock<'a> {
    #[serde(flatten)]
    meta: &'a QuizMeta,
    finished_at: String,
}

#[derive(Serialize)]
struct ScoreBlock {
    #[serde(rename = "final")]
    final_score: u32,
    max: u32,
    correct: usize,
    questions: usize,
}

#[derive(Serialize)]
struct ResultEntry<'a> {
    id: &'a str,
    correct: bool,
    awarded: u32,
    time_remaining: f64,
    timed_out: bool,
    answer: Option<AnswerValue<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum AnswerValue<'a> {
    Text(&'a str),
    List(&'a BTreeSet<String>),
}

impl<'a> From<&'a Answer> for AnswerValue<'a> {
    fn from(answer: &'a Answer) -> Self {
        match answer {
            Answer::FreeText(s) | Answer::SingleChoice(s) => AnswerValue::Text(s),
            Answer::MultiChoice(set) => AnswerValue::List(set),
        }
    }
}

pub fn build_results_yaml(
    quiz: &QuizMeta,
    summary: &SessionSummary,
    finished_at: &DateTime<Local>,
) -> Result<String, LoadError> {
    let doc = ResultsDoc {
        quiz: QuizBlock {
            meta: quiz,
            finished_at: finished_at.to_rfc3339(),
        },
        score: ScoreBlock {
            final_score: summary.final_score,
            max: summary.max_score,
            correct: summary.correct_count,
            questions: summary.question_count,
        },
        results: summary
            .results
            .iter()
            .map(|r| ResultEntry {
                id: &r.question_id,
                correct: r.is_correct,
                awarded: r.awarded,
                // one decimal is all the countdown shows
                time_remaining: (r.time_remaining * 10.0).round() / 10.0,
                timed_out: r.timed_out,
                answer: r.answer.as_ref().map(AnswerValue::from),
            })
            .collect(),
    };

    serde_yaml::to_string(&doc).map_err(|e| LoadError::Results(e.to_string()))
}

pub fn default_results_dir() -> PathBuf {
    ProjectDirs::from("", "", "quizclock")
        .map(|dirs| dirs.data_dir().join("results"))
        .unwrap_or_else(|| PathBuf::from("quizclock-results"))
}

/// `<stem>-<stamp>.yaml`, or `<stem>-<stamp>-N.yaml` when that name is taken.
fn unused_path(dir: &Path, stem: &str, stamp: &str) -> PathBuf {
    let base = format!("{}-{}", stem, stamp);
    let mut path = dir.join(format!("{}.yaml", base));
    let mut n = 1;
    while path.exists() {
        n += 1;
        path = dir.join(format!("{}-{}.yaml", base, n));
    }
    path
}

fn atomic_write(path: &Path, content: &str) -> Result<(), LoadError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content).map_err(|e| LoadError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| LoadError::io(path, e))?;
    Ok(())
}

/// Prints what `--check` reports about a quiz without playing it.
pub fn print_check(quiz: &Quiz, budget: f64) {
    println!("Quiz: {}", quiz.title);
    println!("Source: {} ({})", quiz.source, quiz.hash);
    if let Some(date) = quiz.frontmatter.date {
        println!("Date: {}", date);
    }
    println!("Questions: {}", quiz.questions.len());
    println!("Time per question: {}s", budget);
    for (i, q) in quiz.questions.iter().enumerate() {
        let media = q
            .media
            .as_ref()
            .map(|m| format!(" [{}]", m.kind.label()))
            .unwrap_or_default();
        println!(
            "  {:>2}. {:<14} {:>4} pts  {}{}",
            i + 1,
            q.kind.label(),
            q.points,
            q.id,
            media
        );
    }
    println!("Maximum score: {}", Question::max_points(&quiz.questions));
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn compute_str_hash(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("sha256:{}", hex_encode(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_prefixed() {
        let a = compute_str_hash("quiz");
        assert_eq!(a, compute_str_hash("quiz"));
        assert!(a.starts_with("sha256:"));
        assert_eq!(a.len(), "sha256:".len() + 64);
        assert_ne!(a, compute_str_hash("quiz2"));
    }

    #[test]
    fn unused_path_adds_suffix_when_taken() {
        let dir = tempfile::tempdir().unwrap();
        let first = unused_path(dir.path(), "daily", "20261019-100123");
        assert!(first.ends_with("daily-20261019-100123.yaml"));

        fs::write(&first, "").unwrap();
        let second = unused_path(dir.path(), "daily", "20261019-100123");
        assert!(second.ends_with("daily-20261019-100123-2.yaml"));

        fs::write(&second, "").unwrap();
        let third = unused_path(dir.path(), "daily", "20261019-100123");
        assert!(third.ends_with("daily-20261019-100123-3.yaml"));
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        atomic_write(&path, "a: 1\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a: 1\n");
        assert!(!dir.path().join("out.tmp").exists());
    }
}
