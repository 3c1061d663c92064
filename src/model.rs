use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Largest point value a single question may carry.
pub const MAX_POINTS: u32 = 1_000_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frontmatter {
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Seconds per question; overrides the built-in budget.
    #[serde(default)]
    pub time_budget: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Quiz {
    pub frontmatter: Frontmatter,
    pub title: String,
    pub preamble: Vec<String>,
    pub questions: Vec<Question>,
    pub source: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub kind: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: CorrectAnswer,
    pub points: u32,
    #[serde(default)]
    pub media: Option<Media>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    FreeText,
    SingleChoice,
    MultiChoice,
}

impl QuestionKind {
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionKind::SingleChoice | QuestionKind::MultiChoice)
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestionKind::FreeText => "free text",
            QuestionKind::SingleChoice => "single choice",
            QuestionKind::MultiChoice => "multi choice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Single(String),
    Set(BTreeSet<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub kind: MediaKind,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "image" => Some(MediaKind::Image),
            "audio" => Some(MediaKind::Audio),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

/// A submitted answer, tagged with the kind of question it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    FreeText(String),
    SingleChoice(String),
    MultiChoice(BTreeSet<String>),
}

impl Answer {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Answer::FreeText(_) => QuestionKind::FreeText,
            Answer::SingleChoice(_) => QuestionKind::SingleChoice,
            Answer::MultiChoice(_) => QuestionKind::MultiChoice,
        }
    }

    pub fn multi<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::MultiChoice(items.into_iter().map(Into::into).collect())
    }
}

/// Outcome of one locked question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionResult {
    pub question_id: String,
    pub answer: Option<Answer>,
    pub is_correct: bool,
    pub awarded: u32,
    pub time_remaining: f64,
    pub timed_out: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub final_score: u32,
    pub max_score: u32,
    pub question_count: usize,
    pub correct_count: usize,
    pub results: Vec<QuestionResult>,
    pub answers: HashMap<String, Option<Answer>>,
}

impl Question {
    /// Checks the shape invariants scoring relies on.
    pub fn validate(&self) -> Result<(), QuizError> {
        let invalid = |reason: String| QuizError::InvalidQuestion {
            id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("question id is empty".to_string()));
        }
        if self.points == 0 {
            return Err(invalid("points must be positive".to_string()));
        }
        if self.points > MAX_POINTS {
            return Err(invalid(format!(
                "points {} exceed the maximum of {}",
                self.points, MAX_POINTS
            )));
        }

        if self.kind.is_choice() {
            if self.options.is_empty() {
                return Err(invalid(format!("{} question has no options", self.kind.label())));
            }
            let mut seen = HashSet::new();
            for option in &self.options {
                if !seen.insert(option.as_str()) {
                    return Err(invalid(format!("duplicate option {:?}", option)));
                }
            }
        }

        match (self.kind, &self.correct_answer) {
            (QuestionKind::FreeText, CorrectAnswer::Single(answer)) => {
                if answer.trim().is_empty() {
                    return Err(invalid("correct answer is empty".to_string()));
                }
            }
            (QuestionKind::SingleChoice, CorrectAnswer::Single(answer)) => {
                if !self.options.contains(answer) {
                    return Err(invalid(format!(
                        "correct answer {:?} is not among the options",
                        answer
                    )));
                }
            }
            (QuestionKind::MultiChoice, CorrectAnswer::Set(answers)) => {
                if answers.is_empty() {
                    return Err(invalid("correct answer set is empty".to_string()));
                }
                if let Some(missing) = answers.iter().find(|a| !self.options.contains(*a)) {
                    return Err(invalid(format!(
                        "correct answer {:?} is not among the options",
                        missing
                    )));
                }
            }
            (kind, _) => {
                return Err(invalid(format!(
                    "correct answer shape does not fit a {} question",
                    kind.label()
                )));
            }
        }

        Ok(())
    }

    /// Sum of all points, or `None` when it does not fit in a `u32`.
    pub fn checked_total(questions: &[Question]) -> Option<u32> {
        questions
            .iter()
            .try_fold(0u32, |total, q| total.checked_add(q.points))
    }

    pub fn max_points(questions: &[Question]) -> u32 {
        questions
            .iter()
            .fold(0u32, |total, q| total.saturating_add(q.points))
    }
}
