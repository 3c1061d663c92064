pub mod cli;
pub mod error;
pub mod model;
pub mod parser;
pub mod persist;
pub mod provider;
pub mod session;
pub mod state;
pub mod timer;
pub mod tui;
pub mod ui;

pub use error::{LoadError, QuizError};
pub use model::{Answer, Media, MediaKind, Question, QuestionKind, QuestionResult, SessionSummary};
pub use session::{Phase, QuizSession, TickOutcome};
