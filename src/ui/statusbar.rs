use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::AppState;

pub fn draw_statusbar(f: &mut Frame, area: Rect, state: &AppState) {
    let results = state.session.results();
    let correct = results.iter().filter(|r| r.is_correct).count();
    let timed_out = results.iter().filter(|r| r.timed_out).count();
    let wrong = results.len() - correct - timed_out;

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!("✓ {} correct", correct),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(format!("✗ {} wrong", wrong), Style::default().fg(Color::Red)),
        Span::raw("   "),
        Span::styled(
            format!("⏱ {} timed out", timed_out),
            Style::default().fg(Color::Yellow),
        ),
    ];

    if let Some(notice) = &state.notice {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            notice.clone(),
            Style::default().fg(Color::White),
        ));
    }

    let widget =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(30, 30, 30)));
    f.render_widget(widget, area);
}
