use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::QuizError;
use crate::model::*;
use crate::session::{Phase, QuizSession, TickOutcome};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Preamble,
    Playing,
    Summary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    ConfirmQuit,
    Help,
}

/// How an option is shown, derived from the session rather than stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionMark {
    Plain,
    Selected,
    Correct,
    Wrong,
    Missed,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub title: String,
    pub preamble: Vec<String>,
    pub session: QuizSession,
    pub choice_cursor: usize,
    pub selected: BTreeSet<usize>,
    pub text_input: String,
    pub text_cursor: usize,
    pub dialog_stack: Vec<Dialog>,
    pub notice: Option<String>,
    pub summary: Option<SessionSummary>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(quiz: &Quiz, session: QuizSession) -> Self {
        Self {
            screen: Screen::Preamble,
            title: quiz.title.clone(),
            preamble: quiz.preamble.clone(),
            session,
            choice_cursor: 0,
            selected: BTreeSet::new(),
            text_input: String::new(),
            text_cursor: 0,
            dialog_stack: Vec::new(),
            notice: None,
            summary: None,
            should_quit: false,
        }
    }

    pub fn start(&mut self) {
        if self.screen == Screen::Preamble {
            self.screen = Screen::Playing;
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    pub fn is_revealed(&self) -> bool {
        self.session.phase() == Phase::AnswerLocked
    }

    pub fn is_open(&self) -> bool {
        self.screen == Screen::Playing && self.session.phase() == Phase::InProgress
    }

    pub fn option_count(&self) -> usize {
        self.current_question().map_or(0, |q| q.options.len())
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.option_count();
        if count == 0 {
            return;
        }
        let next = (self.choice_cursor as isize + delta).rem_euclid(count as isize);
        self.choice_cursor = next as usize;
    }

    /// Selects option `idx` for single choice, toggles it for multi choice.
    pub fn choose(&mut self, idx: usize) {
        if !self.is_open() {
            return;
        }
        let Some(kind) = self.current_question().map(|q| q.kind) else {
            return;
        };
        if idx >= self.option_count() {
            return;
        }

        self.choice_cursor = idx;
        match kind {
            QuestionKind::SingleChoice => {
                self.selected.clear();
                self.selected.insert(idx);
            }
            QuestionKind::MultiChoice => {
                if !self.selected.remove(&idx) {
                    self.selected.insert(idx);
                }
            }
            QuestionKind::FreeText => {}
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.is_open() {
            return;
        }
        self.text_input.insert(self.text_cursor, c);
        self.text_cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if !self.is_open() || self.text_cursor == 0 {
            return;
        }
        let prev = self.text_input[..self.text_cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i);
        self.text_input.remove(prev);
        self.text_cursor = prev;
    }

    pub fn cursor_left(&mut self) {
        self.text_cursor = self.text_input[..self.text_cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i);
    }

    pub fn cursor_right(&mut self) {
        if let Some(c) = self.text_input[self.text_cursor..].chars().next() {
            self.text_cursor += c.len_utf8();
        }
    }

    /// Builds the answer from the current selection or text input.
    pub fn pending_answer(&self) -> Option<Answer> {
        let question = self.current_question()?;
        let picked = || {
            self.selected
                .iter()
                .filter_map(|&i| question.options.get(i).cloned())
        };

        match question.kind {
            QuestionKind::FreeText => Some(Answer::FreeText(self.text_input.clone())),
            QuestionKind::SingleChoice => picked().next().map(Answer::SingleChoice),
            QuestionKind::MultiChoice => {
                let set: BTreeSet<String> = picked().collect();
                if set.is_empty() {
                    None
                } else {
                    Some(Answer::MultiChoice(set))
                }
            }
        }
    }

    /// Locks the pending answer. Choice questions need a selection first.
    pub fn lock_answer(&mut self) -> Result<Option<QuestionResult>, QuizError> {
        if !self.is_open() {
            return Ok(None);
        }
        let Some(answer) = self.pending_answer() else {
            self.notice = Some("Select an option first".to_string());
            return Ok(None);
        };

        let result = self.session.submit_answer(Some(answer))?;
        self.notice = None;
        Ok(Some(result))
    }

    /// Moves past the revealed answer, entering the summary after the last one.
    pub fn next(&mut self) -> Result<(), QuizError> {
        if !self.is_revealed() {
            return Ok(());
        }

        match self.session.advance()? {
            Phase::Completed => {
                self.summary = self.session.summary();
                self.screen = Screen::Summary;
            }
            _ => {
                self.choice_cursor = 0;
                self.selected.clear();
                self.text_input.clear();
                self.text_cursor = 0;
                self.notice = None;
            }
        }
        Ok(())
    }

    pub fn on_tick(&mut self, elapsed: Duration) -> TickOutcome {
        if self.screen != Screen::Playing {
            return TickOutcome::Ignored;
        }
        let outcome = self.session.tick(elapsed.as_secs_f64());
        if let TickOutcome::Expired(_) = outcome {
            self.notice = Some("Time's up!".to_string());
        }
        outcome
    }

    pub fn option_mark(&self, idx: usize) -> OptionMark {
        let selected = self.selected.contains(&idx);
        let Some(question) = self.current_question() else {
            return OptionMark::Plain;
        };

        if !self.is_revealed() {
            return if selected {
                OptionMark::Selected
            } else {
                OptionMark::Plain
            };
        }

        let Some(option) = question.options.get(idx) else {
            return OptionMark::Plain;
        };
        let correct = match &question.correct_answer {
            CorrectAnswer::Single(answer) => answer == option,
            CorrectAnswer::Set(answers) => answers.contains(option),
        };

        match (correct, selected) {
            (true, true) => OptionMark::Correct,
            (true, false) if question.kind == QuestionKind::MultiChoice => OptionMark::Missed,
            (true, false) => OptionMark::Correct,
            (false, true) => OptionMark::Wrong,
            (false, false) => OptionMark::Plain,
        }
    }

    pub fn has_dialog(&self) -> bool {
        !self.dialog_stack.is_empty()
    }

    pub fn top_dialog(&self) -> Option<&Dialog> {
        self.dialog_stack.last()
    }

    pub fn push_dialog(&mut self, dialog: Dialog) {
        self.dialog_stack.push(dialog);
    }

    pub fn pop_dialog(&mut self) -> Option<Dialog> {
        self.dialog_stack.pop()
    }
}
