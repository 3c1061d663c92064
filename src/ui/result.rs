use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::state::AppState;

pub fn draw_summary(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(summary) = &state.summary else {
        return;
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("✓  {} complete", state.title),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}", summary.final_score),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("of {} points", summary.max_score),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(format!(
            "{} of {} questions correct",
            summary.correct_count, summary.question_count
        )),
        Line::from(""),
    ];

    for (i, r) in summary.results.iter().enumerate() {
        let (mark, color) = if r.is_correct {
            ("✓", Color::Green)
        } else if r.timed_out {
            ("⏱", Color::Yellow)
        } else {
            ("✗", Color::Red)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", mark), Style::default().fg(color)),
            Span::raw(format!("Q{:<3}", i + 1)),
            Span::styled(
                format!("{:>5} pts", r.awarded),
                Style::default().fg(Color::Yellow),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] Exit",
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
