//! The quiz session engine.
//!
//! A `QuizSession` walks an ordered list of questions. Each question starts
//! `InProgress` with a full time budget, becomes `AnswerLocked` once an answer
//! is submitted or the clock runs out, and `advance` moves on to the next one.
//! Passing the last question completes the session.
//!
//! The engine does no I/O and owns no clock: the host calls [`QuizSession::tick`]
//! with the elapsed time, which keeps it deterministic under test.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, info, warn};

use crate::error::QuizError;
use crate::model::{Answer, CorrectAnswer, Question, QuestionResult, SessionSummary};

/// Seconds allowed per question unless the quiz overrides it.
pub const QUESTION_TIME_BUDGET: f64 = 20.0;

/// Correct answers never earn less than this fraction of their points.
pub const MIN_TIME_FACTOR: f64 = 0.1;

// Remaining time at or below this counts as expired (float drift from ticks).
const EXPIRY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    AnswerLocked,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::InProgress => "in progress",
            Phase::AnswerLocked => "answer locked",
            Phase::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Time was deducted and the question is still open.
    Running,
    /// The clock reached zero and the question was locked with no answer.
    Expired(QuestionResult),
    /// The tick arrived outside `InProgress` or carried an unusable delta.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    budget: f64,
    current_index: usize,
    score: u32,
    answers: HashMap<String, Option<Answer>>,
    results: Vec<QuestionResult>,
    time_remaining: f64,
    phase: Phase,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        Self::with_budget(questions, QUESTION_TIME_BUDGET)
    }

    pub fn with_budget(questions: Vec<Question>, budget: f64) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::InvalidSession(
                "question sequence is empty".to_string(),
            ));
        }
        if !budget.is_finite() || budget <= 0.0 {
            return Err(QuizError::InvalidSession(format!(
                "time budget must be a positive number of seconds, got {}",
                budget
            )));
        }

        let mut seen = HashSet::new();
        for question in &questions {
            question.validate()?;
            if !seen.insert(question.id.as_str()) {
                return Err(QuizError::InvalidQuestion {
                    id: question.id.clone(),
                    reason: "duplicate question id".to_string(),
                });
            }
        }

        if Question::checked_total(&questions).is_none() {
            return Err(QuizError::InvalidSession(
                "total points do not fit in a score".to_string(),
            ));
        }

        debug!(questions = questions.len(), budget, "quiz session created");

        Ok(Self {
            questions,
            budget,
            current_index: 0,
            score: 0,
            answers: HashMap::new(),
            results: Vec::new(),
            time_remaining: budget,
            phase: Phase::InProgress,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question being played, or `None` once the session is completed.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        Question::max_points(&self.questions)
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn time_remaining(&self) -> f64 {
        self.time_remaining
    }

    pub fn time_factor(&self) -> f64 {
        time_factor(self.time_remaining, self.budget)
    }

    pub fn answers(&self) -> &HashMap<String, Option<Answer>> {
        &self.answers
    }

    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    /// Result for the question currently showing its locked answer.
    pub fn last_result(&self) -> Option<&QuestionResult> {
        match self.phase {
            Phase::AnswerLocked => self.results.last(),
            _ => None,
        }
    }

    /// Locks the current question with `answer` (or no answer) and scores it.
    pub fn submit_answer(&mut self, answer: Option<Answer>) -> Result<QuestionResult, QuizError> {
        if self.phase != Phase::InProgress {
            warn!(phase = %self.phase, "answer submitted outside an open question");
            return Err(QuizError::InvalidState {
                operation: "submit an answer",
                phase: self.phase,
            });
        }

        let expected = self.questions[self.current_index].kind;
        if let Some(given) = &answer {
            if given.kind() != expected {
                warn!(
                    expected = expected.label(),
                    given = given.kind().label(),
                    "answer kind does not match question"
                );
                return Err(QuizError::InvalidState {
                    operation: "submit an answer of a different kind than the question",
                    phase: self.phase,
                });
            }
        }

        Ok(self.lock(answer, false))
    }

    /// Deducts `delta_seconds` from the clock, locking the question when it runs out.
    pub fn tick(&mut self, delta_seconds: f64) -> TickOutcome {
        if self.phase != Phase::InProgress || !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return TickOutcome::Ignored;
        }

        self.time_remaining = (self.time_remaining - delta_seconds).max(0.0);
        if self.time_remaining <= EXPIRY_EPSILON {
            self.time_remaining = 0.0;
            debug!(index = self.current_index, "question timed out");
            TickOutcome::Expired(self.lock(None, true))
        } else {
            TickOutcome::Running
        }
    }

    /// Moves past a locked question; returns the phase after the move.
    pub fn advance(&mut self) -> Result<Phase, QuizError> {
        if self.phase != Phase::AnswerLocked {
            warn!(phase = %self.phase, "advance requested before the answer was locked");
            return Err(QuizError::InvalidState {
                operation: "advance",
                phase: self.phase,
            });
        }

        self.current_index += 1;
        if self.current_index >= self.questions.len() {
            self.phase = Phase::Completed;
            info!(
                score = self.score,
                max = self.max_score(),
                questions = self.questions.len(),
                "quiz session completed"
            );
        } else {
            self.time_remaining = self.budget;
            self.phase = Phase::InProgress;
            debug!(index = self.current_index, "next question");
        }

        Ok(self.phase)
    }

    /// Final tally; only available once the session is completed.
    pub fn summary(&self) -> Option<SessionSummary> {
        if self.phase != Phase::Completed {
            return None;
        }

        Some(SessionSummary {
            final_score: self.score,
            max_score: self.max_score(),
            question_count: self.questions.len(),
            correct_count: self.results.iter().filter(|r| r.is_correct).count(),
            results: self.results.clone(),
            answers: self.answers.clone(),
        })
    }

    fn lock(&mut self, answer: Option<Answer>, timed_out: bool) -> QuestionResult {
        let question = &self.questions[self.current_index];

        let is_correct = answer
            .as_ref()
            .map_or(false, |given| is_correct(&question.correct_answer, given));
        let awarded = if is_correct {
            awarded_points(question.points, self.time_remaining, self.budget)
        } else {
            0
        };

        self.score = self.score.saturating_add(awarded);
        self.answers.insert(question.id.clone(), answer.clone());

        let result = QuestionResult {
            question_id: question.id.clone(),
            answer,
            is_correct,
            awarded,
            time_remaining: self.time_remaining,
            timed_out,
        };
        self.results.push(result.clone());
        self.phase = Phase::AnswerLocked;

        debug!(
            id = %result.question_id,
            correct = result.is_correct,
            awarded = result.awarded,
            score = self.score,
            "answer locked"
        );

        result
    }
}

/// Linear decay of the remaining time, floored at [`MIN_TIME_FACTOR`].
pub fn time_factor(time_remaining: f64, budget: f64) -> f64 {
    (time_remaining / budget).clamp(MIN_TIME_FACTOR, 1.0)
}

pub fn awarded_points(points: u32, time_remaining: f64, budget: f64) -> u32 {
    (f64::from(points) * time_factor(time_remaining, budget)).round() as u32
}

fn is_correct(expected: &CorrectAnswer, given: &Answer) -> bool {
    match (expected, given) {
        (CorrectAnswer::Single(expected), Answer::FreeText(given)) => {
            given.trim().to_lowercase() == expected.trim().to_lowercase()
        }
        (CorrectAnswer::Single(expected), Answer::SingleChoice(given)) => {
            given.to_lowercase() == expected.to_lowercase()
        }
        (CorrectAnswer::Set(expected), Answer::MultiChoice(given)) => given == expected,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionKind, MAX_POINTS};

    fn paris() -> Question {
        Question {
            id: "q1".to_string(),
            text: "Capital of France?".to_string(),
            kind: QuestionKind::SingleChoice,
            options: vec!["Paris".to_string(), "Lyon".to_string()],
            correct_answer: CorrectAnswer::Single("Paris".to_string()),
            points: 100,
            media: None,
        }
    }

    fn forty_two() -> Question {
        Question {
            id: "q2".to_string(),
            text: "The answer?".to_string(),
            kind: QuestionKind::FreeText,
            options: Vec::new(),
            correct_answer: CorrectAnswer::Single("42".to_string()),
            points: 200,
            media: None,
        }
    }

    fn primes() -> Question {
        Question {
            id: "q3".to_string(),
            text: "Pick the primes".to_string(),
            kind: QuestionKind::MultiChoice,
            options: ["2", "3", "4", "5"].iter().map(|s| s.to_string()).collect(),
            correct_answer: CorrectAnswer::Set(
                ["2", "3", "5"].iter().map(|s| s.to_string()).collect(),
            ),
            points: 150,
            media: None,
        }
    }

    #[test]
    fn starts_in_progress_with_full_budget() {
        let session = QuizSession::new(vec![paris()]).unwrap();
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.time_remaining(), QUESTION_TIME_BUDGET);
        assert!(session.summary().is_none());
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let err = QuizSession::new(Vec::new()).unwrap_err();
        assert!(matches!(err, QuizError::InvalidSession(_)));
    }

    #[test]
    fn malformed_question_is_rejected() {
        let mut q = paris();
        q.correct_answer = CorrectAnswer::Single("Marseille".to_string());
        let err = QuizSession::new(vec![q]).unwrap_err();
        assert!(matches!(err, QuizError::InvalidQuestion { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = QuizSession::new(vec![paris(), paris()]).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidQuestion { ref reason, .. } if reason.contains("duplicate")
        ));
    }

    #[test]
    fn oversized_points_are_rejected() {
        let mut big = forty_two();
        big.points = u32::MAX;
        let mut other = forty_two();
        other.id = "q3".to_string();
        other.points = u32::MAX;
        let err = QuizSession::new(vec![big, other]).unwrap_err();
        assert!(matches!(err, QuizError::InvalidQuestion { .. }));
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let questions: Vec<Question> = (0..4_295)
            .map(|i| {
                let mut q = forty_two();
                q.id = format!("q{}", i);
                q.points = MAX_POINTS;
                q
            })
            .collect();
        let err = QuizSession::new(questions).unwrap_err();
        assert!(matches!(err, QuizError::InvalidSession(_)));
    }

    #[test]
    fn largest_allowed_points_score_without_overflow() {
        let mut q = forty_two();
        q.points = MAX_POINTS;
        let mut session = QuizSession::new(vec![q]).unwrap();
        let result = session
            .submit_answer(Some(Answer::FreeText("42".to_string())))
            .unwrap();
        assert_eq!(result.awarded, MAX_POINTS);
        assert_eq!(session.advance().unwrap(), Phase::Completed);
        assert_eq!(session.summary().unwrap().final_score, MAX_POINTS);
    }

    #[test]
    fn non_positive_budget_is_rejected() {
        assert!(QuizSession::with_budget(vec![paris()], 0.0).is_err());
        assert!(QuizSession::with_budget(vec![paris()], f64::NAN).is_err());
    }

    #[test]
    fn full_time_correct_answer_earns_full_points() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        let result = session
            .submit_answer(Some(Answer::SingleChoice("Paris".to_string())))
            .unwrap();
        assert!(result.is_correct);
        assert_eq!(result.awarded, 100);
        assert_eq!(session.score(), 100);
        assert_eq!(session.phase(), Phase::AnswerLocked);
        assert_eq!(session.last_result(), Some(&result));
    }

    #[test]
    fn comparison_ignores_case() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        let result = session
            .submit_answer(Some(Answer::SingleChoice("paris".to_string())))
            .unwrap();
        assert!(result.is_correct);
    }

    #[test]
    fn free_text_is_trimmed() {
        let mut session = QuizSession::new(vec![forty_two()]).unwrap();
        let result = session
            .submit_answer(Some(Answer::FreeText("  42 ".to_string())))
            .unwrap();
        assert!(result.is_correct);
        assert_eq!(result.awarded, 200);
    }

    #[test]
    fn no_answer_scores_zero() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        let result = session.submit_answer(None).unwrap();
        assert!(!result.is_correct);
        assert_eq!(result.awarded, 0);
        assert!(!result.timed_out);
        assert_eq!(session.answers().get("q1"), Some(&None));
    }

    #[test]
    fn wrong_answer_scores_zero() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        let result = session
            .submit_answer(Some(Answer::SingleChoice("Lyon".to_string())))
            .unwrap();
        assert!(!result.is_correct);
        assert_eq!(result.awarded, 0);
    }

    #[test]
    fn multi_choice_uses_set_equality() {
        let mut session = QuizSession::new(vec![primes()]).unwrap();
        let result = session
            .submit_answer(Some(Answer::multi(["5", "2", "3"])))
            .unwrap();
        assert!(result.is_correct);
        assert_eq!(result.awarded, 150);
    }

    #[test]
    fn multi_choice_subset_and_superset_are_wrong() {
        for picks in [vec!["2", "3"], vec!["2", "3", "4", "5"]] {
            let mut session = QuizSession::new(vec![primes()]).unwrap();
            let result = session.submit_answer(Some(Answer::multi(picks))).unwrap();
            assert!(!result.is_correct);
            assert_eq!(result.awarded, 0);
        }
    }

    #[test]
    fn mismatched_answer_kind_is_rejected_without_locking() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        let err = session
            .submit_answer(Some(Answer::FreeText("Paris".to_string())))
            .unwrap_err();
        assert!(matches!(err, QuizError::InvalidState { phase: Phase::InProgress, .. }));
        assert_eq!(session.phase(), Phase::InProgress);
        assert!(session.answers().is_empty());
    }

    #[test]
    fn second_submission_is_rejected() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        session
            .submit_answer(Some(Answer::SingleChoice("Paris".to_string())))
            .unwrap();
        let err = session
            .submit_answer(Some(Answer::SingleChoice("Paris".to_string())))
            .unwrap_err();
        assert!(matches!(err, QuizError::InvalidState { phase: Phase::AnswerLocked, .. }));
        assert_eq!(session.score(), 100);
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn advance_requires_locked_answer() {
        let mut session = QuizSession::new(vec![paris(), forty_two()]).unwrap();
        assert!(session.advance().is_err());
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn advance_resets_clock_and_clears_last_result() {
        let mut session = QuizSession::new(vec![paris(), forty_two()]).unwrap();
        session.tick(5.0);
        session.submit_answer(None).unwrap();
        assert_eq!(session.advance().unwrap(), Phase::InProgress);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.time_remaining(), QUESTION_TIME_BUDGET);
        assert!(session.last_result().is_none());
    }

    #[test]
    fn half_time_halves_points() {
        let mut session = QuizSession::new(vec![forty_two()]).unwrap();
        assert_eq!(session.tick(10.0), TickOutcome::Running);
        let result = session
            .submit_answer(Some(Answer::FreeText("42".to_string())))
            .unwrap();
        assert_eq!(result.awarded, 100);
    }

    #[test]
    fn late_answer_gets_floor_factor() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        session.tick(19.9);
        let result = session
            .submit_answer(Some(Answer::SingleChoice("Paris".to_string())))
            .unwrap();
        assert_eq!(result.awarded, 10);
    }

    #[test]
    fn floor_factor_applies_at_zero_time() {
        assert_eq!(time_factor(0.0, QUESTION_TIME_BUDGET), MIN_TIME_FACTOR);
        assert_eq!(awarded_points(100, 0.0, QUESTION_TIME_BUDGET), 10);
        assert_eq!(awarded_points(5, 0.0, QUESTION_TIME_BUDGET), 1);
    }

    #[test]
    fn rounding_is_half_up() {
        // 15 * 0.5 = 7.5
        assert_eq!(awarded_points(15, 10.0, 20.0), 8);
    }

    #[test]
    fn expiry_fires_once() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        let outcome = session.tick(25.0);
        match outcome {
            TickOutcome::Expired(result) => {
                assert!(result.timed_out);
                assert!(!result.is_correct);
                assert_eq!(result.awarded, 0);
            }
            other => panic!("expected expiry, got {:?}", other),
        }
        assert_eq!(session.time_remaining(), 0.0);
        assert_eq!(session.tick(0.1), TickOutcome::Ignored);
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.phase(), Phase::AnswerLocked);
    }

    #[test]
    fn many_small_ticks_expire_cleanly() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        let mut expired = 0;
        for _ in 0..250 {
            if let TickOutcome::Expired(_) = session.tick(0.1) {
                expired += 1;
            }
        }
        assert_eq!(expired, 1);
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn bad_deltas_are_ignored() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        assert_eq!(session.tick(-1.0), TickOutcome::Ignored);
        assert_eq!(session.tick(f64::INFINITY), TickOutcome::Ignored);
        assert_eq!(session.time_remaining(), QUESTION_TIME_BUDGET);
    }

    #[test]
    fn completed_session_rejects_everything() {
        let mut session = QuizSession::new(vec![paris()]).unwrap();
        session.submit_answer(None).unwrap();
        assert_eq!(session.advance().unwrap(), Phase::Completed);
        assert!(session.current_question().is_none());
        assert!(session.submit_answer(None).is_err());
        assert!(session.advance().is_err());
        assert_eq!(session.tick(1.0), TickOutcome::Ignored);

        let summary = session.summary().unwrap();
        assert_eq!(summary.final_score, 0);
        assert_eq!(summary.question_count, 1);
    }

    #[test]
    fn custom_budget_scales_decay() {
        let mut session = QuizSession::with_budget(vec![paris()], 10.0).unwrap();
        session.tick(5.0);
        let result = session
            .submit_answer(Some(Answer::SingleChoice("Paris".to_string())))
            .unwrap();
        assert_eq!(result.awarded, 50);
    }
}
