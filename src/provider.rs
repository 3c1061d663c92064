//! Question providers.
//!
//! The engine only needs the materialized list of questions; where it comes
//! from is up to the host. Quiz files are markdown (see `parser`), either one
//! file or a directory of files named by date (`2026-10-19.md`).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::error::LoadError;
use crate::model::{Question, Quiz};
use crate::parser;
use crate::persist::compute_str_hash;

pub trait QuestionProvider {
    fn load_daily_questions(&self) -> Result<Vec<Question>, LoadError>;
}

/// Serves a fixed list, e.g. questions built in code.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    questions: Vec<Question>,
}

impl StaticProvider {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

impl QuestionProvider for StaticProvider {
    fn load_daily_questions(&self) -> Result<Vec<Question>, LoadError> {
        validate_all(&self.questions)?;
        Ok(self.questions.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_quiz(&self) -> Result<Quiz, LoadError> {
        load_quiz_file(&self.path)
    }
}

impl QuestionProvider for FileProvider {
    fn load_daily_questions(&self) -> Result<Vec<Question>, LoadError> {
        Ok(self.load_quiz()?.questions)
    }
}

/// Picks `<dir>/<date>.md`, or the only quiz file when the directory has one.
#[derive(Debug, Clone)]
pub struct DailyProvider {
    dir: PathBuf,
    date: NaiveDate,
}

impl DailyProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::for_date(dir, Local::now().date_naive())
    }

    pub fn for_date(dir: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            dir: dir.into(),
            date,
        }
    }

    pub fn resolve_path(&self) -> Result<PathBuf, LoadError> {
        let dated = self.dir.join(format!("{}.md", self.date.format("%Y-%m-%d")));
        if dated.is_file() {
            return Ok(dated);
        }

        let mut md_files = list_quiz_files(&self.dir)?;
        match md_files.len() {
            0 => Err(LoadError::NotFound(format!(
                "no .md quiz files found in {}",
                self.dir.display()
            ))),
            1 => Ok(md_files.remove(0)),
            _ => Err(LoadError::NotFound(format!(
                "no quiz for {} in {} ({} other quiz files present)",
                self.date,
                self.dir.display(),
                md_files.len()
            ))),
        }
    }

    pub fn load_quiz(&self) -> Result<Quiz, LoadError> {
        let path = self.resolve_path()?;
        debug!(path = %path.display(), date = %self.date, "daily quiz selected");
        load_quiz_file(&path)
    }
}

impl QuestionProvider for DailyProvider {
    fn load_daily_questions(&self) -> Result<Vec<Question>, LoadError> {
        Ok(self.load_quiz()?.questions)
    }
}

/// Loads a quiz from a `.md` file or a directory of dated quiz files.
pub fn resolve_source(path: &Path, date: Option<NaiveDate>) -> Result<Quiz, LoadError> {
    if path.is_file() {
        FileProvider::new(path).load_quiz()
    } else if path.is_dir() {
        let provider = match date {
            Some(d) => DailyProvider::for_date(path, d),
            None => DailyProvider::new(path),
        };
        provider.load_quiz()
    } else {
        Err(LoadError::NotFound(format!(
            "path not found: {}",
            path.display()
        )))
    }
}

fn load_quiz_file(path: &Path) -> Result<Quiz, LoadError> {
    let content = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;

    let source = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let quiz = parser::parse_quiz(&content, &source, &compute_str_hash(&content))?;
    validate_all(&quiz.questions)?;

    debug!(
        source = %quiz.source,
        questions = quiz.questions.len(),
        "quiz loaded"
    );
    Ok(quiz)
}

fn validate_all(questions: &[Question]) -> Result<(), LoadError> {
    for question in questions {
        question.validate()?;
    }
    Ok(())
}

fn list_quiz_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut md_files: Vec<PathBuf> = Vec::new();

    let entries = fs::read_dir(dir).map_err(|e| LoadError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |e| e == "md") {
            md_files.push(path);
        }
    }

    md_files.sort();
    Ok(md_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizError;
    use crate::model::{CorrectAnswer, QuestionKind};

    const QUIZ: &str = "---\ntitle: Daily\n---\n## 1. Q\nSay 42.\n\n> answer: 42\n";

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn picks_file_for_date() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2026-10-18.md"), QUIZ).unwrap();
        fs::write(dir.path().join("2026-10-19.md"), QUIZ).unwrap();

        let provider = DailyProvider::for_date(dir.path(), date("2026-10-19"));
        let path = provider.resolve_path().unwrap();
        assert!(path.ends_with("2026-10-19.md"));
        assert_eq!(provider.load_daily_questions().unwrap().len(), 1);
    }

    #[test]
    fn falls_back_to_single_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("weekly.md"), QUIZ).unwrap();

        let provider = DailyProvider::for_date(dir.path(), date("2026-10-19"));
        assert!(provider.resolve_path().unwrap().ends_with("weekly.md"));
    }

    #[test]
    fn ambiguous_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), QUIZ).unwrap();
        fs::write(dir.path().join("b.md"), QUIZ).unwrap();

        let provider = DailyProvider::for_date(dir.path(), date("2026-10-19"));
        assert!(matches!(provider.resolve_path(), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn quiz_hash_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.md");
        fs::write(&path, QUIZ).unwrap();

        let quiz = resolve_source(&path, None).unwrap();
        assert!(quiz.hash.starts_with("sha256:"));
        assert_eq!(quiz.source, "q.md");
    }

    #[test]
    fn free_text_without_answer_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.md");
        fs::write(&path, "---\ntitle: t\n---\n## 1. Q\nNo answer given.\n").unwrap();

        let err = FileProvider::new(&path).load_daily_questions().unwrap_err();
        assert!(matches!(err, LoadError::Quiz(QuizError::InvalidQuestion { .. })));
    }

    #[test]
    fn static_provider_validates() {
        let bad = Question {
            id: "q1".to_string(),
            text: "?".to_string(),
            kind: QuestionKind::SingleChoice,
            options: Vec::new(),
            correct_answer: CorrectAnswer::Single("x".to_string()),
            points: 10,
            media: None,
        };
        assert!(StaticProvider::new(vec![bad]).load_daily_questions().is_err());
    }
}
