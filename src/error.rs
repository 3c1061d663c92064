//! Error types for the quiz engine and its host.
//!
//! `QuizError` covers contract violations detected by the engine itself.
//! `LoadError` covers everything that touches the filesystem: reading quiz
//! files, picking the daily quiz, and writing results.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::Phase;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuizError {
    /// The question sequence or session parameters cannot form a session.
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// A question is malformed and would corrupt scoring.
    #[error("invalid question {id}: {reason}")]
    InvalidQuestion { id: String, reason: String },

    /// The operation is not allowed in the current phase.
    #[error("cannot {operation} while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid quiz file: {0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("cannot write results: {0}")]
    Results(String),

    #[error(transparent)]
    Quiz(#[from] QuizError),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}
