use std::io;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;
use tracing::{debug, warn};

use crate::model::QuestionKind;
use crate::state::*;
use crate::timer::TimerEvent;

const INPUT_POLL: Duration = Duration::from_millis(25);

/// Runs the quiz until the player quits; returns the final state.
pub fn run_tui(mut state: AppState, timer_rx: mpsc::Receiver<TimerEvent>) -> Result<AppState> {
    enable_raw_mode().context("cannot enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("cannot enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("cannot create terminal")?;

    let result = main_loop(&mut terminal, &mut state, &timer_rx);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result.map(|()| state)
}

fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    timer_rx: &mpsc::Receiver<TimerEvent>,
) -> Result<()> {
    loop {
        terminal
            .draw(|f| crate::ui::draw(f, state))
            .context("draw error")?;

        if state.should_quit {
            break;
        }

        if event::poll(INPUT_POLL).context("poll error")? {
            if let Event::Key(key) = event::read().context("read error")? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, state);
                }
            }
        }

        while let Ok(TimerEvent::Tick(elapsed)) = timer_rx.try_recv() {
            state.on_tick(elapsed);
        }
    }

    Ok(())
}

pub fn handle_key(key: KeyEvent, state: &mut AppState) {
    if state.has_dialog() {
        handle_dialog_key(key, state);
        return;
    }

    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        if state.screen == Screen::Summary {
            state.should_quit = true;
        } else {
            state.push_dialog(Dialog::ConfirmQuit);
        }
        return;
    }

    match state.screen {
        Screen::Preamble => {
            if key.code == KeyCode::Enter {
                state.start();
                debug!("quiz started");
            }
        }
        Screen::Playing => handle_playing_key(key, state),
        Screen::Summary => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                state.should_quit = true;
            }
        }
    }
}

fn handle_playing_key(key: KeyEvent, state: &mut AppState) {
    if key.code == KeyCode::F(1) {
        state.push_dialog(Dialog::Help);
        return;
    }

    if state.is_revealed() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Right | KeyCode::Char(' ')) {
            if let Err(e) = state.next() {
                warn!("{}", e);
            }
        }
        return;
    }

    let kind = state.current_question().map(|q| q.kind);
    match kind {
        Some(QuestionKind::FreeText) => handle_text_key(key, state),
        Some(QuestionKind::SingleChoice | QuestionKind::MultiChoice) => {
            handle_choice_key(key, state)
        }
        None => {}
    }
}

fn handle_text_key(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.insert_char(c);
        }
        KeyCode::Backspace => state.backspace(),
        KeyCode::Left => state.cursor_left(),
        KeyCode::Right => state.cursor_right(),
        KeyCode::Home => state.text_cursor = 0,
        KeyCode::End => state.text_cursor = state.text_input.len(),
        KeyCode::Enter => lock(state),
        _ => {}
    }
}

fn handle_choice_key(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Up => state.move_cursor(-1),
        KeyCode::Down => state.move_cursor(1),
        KeyCode::Char(' ') => state.choose(state.choice_cursor),
        KeyCode::Char('?') => state.push_dialog(Dialog::Help),
        KeyCode::Char(c)
            if c.is_ascii_lowercase() && !key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            state.choose((c as u8 - b'a') as usize);
        }
        KeyCode::Enter => lock(state),
        _ => {}
    }
}

fn lock(state: &mut AppState) {
    if let Err(e) = state.lock_answer() {
        warn!("{}", e);
        state.notice = Some(e.to_string());
    }
}

fn handle_dialog_key(key: KeyEvent, state: &mut AppState) {
    let Some(dialog) = state.top_dialog().cloned() else {
        return;
    };

    match dialog {
        Dialog::ConfirmQuit => match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                state.pop_dialog();
                state.should_quit = true;
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                state.pop_dialog();
            }
            _ => {}
        },
        Dialog::Help => {
            state.pop_dialog();
        }
    }
}
