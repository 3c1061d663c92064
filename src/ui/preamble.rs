use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::state::AppState;
use crate::timer::format_countdown;

pub fn draw_preamble(f: &mut Frame, area: Rect, state: &AppState) {
    let session = &state.session;

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            state.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for text in &state.preamble {
        lines.push(Line::from(text.as_str()));
    }
    if !state.preamble.is_empty() {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(format!(
        "{} questions  ·  {} per question  ·  up to {} points",
        session.question_count(),
        format_countdown(session.budget()),
        session.max_score()
    )));
    lines.push(Line::from(Span::styled(
        "Answer fast: points shrink as the clock runs down.",
        Style::default().fg(Color::Gray),
    )));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter to start",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
