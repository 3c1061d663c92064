use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::model::QuestionKind;
use crate::state::AppState;

pub fn draw_keybar(f: &mut Frame, area: Rect, state: &AppState) {
    let kind = state.current_question().map(|q| q.kind);

    let bindings: Vec<(&str, &str)> = if state.is_revealed() {
        vec![("Enter", "continue"), ("F1", "help"), ("Ctrl+Q", "quit")]
    } else {
        match kind {
            Some(QuestionKind::FreeText) => vec![
                ("type", "answer"),
                ("←/→", "cursor"),
                ("Enter", "lock answer"),
                ("F1", "help"),
                ("Ctrl+Q", "quit"),
            ],
            Some(QuestionKind::SingleChoice) => vec![
                ("a-z", "pick"),
                ("↑/↓ Space", "move/pick"),
                ("Enter", "lock answer"),
                ("?", "help"),
                ("Ctrl+Q", "quit"),
            ],
            Some(QuestionKind::MultiChoice) => vec![
                ("a-z", "toggle"),
                ("↑/↓ Space", "move/toggle"),
                ("Enter", "lock answer"),
                ("?", "help"),
                ("Ctrl+Q", "quit"),
            ],
            None => vec![("Ctrl+Q", "quit")],
        }
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, action)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let line = Line::from(spans);
    let widget = Paragraph::new(line).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(widget, area);
}
