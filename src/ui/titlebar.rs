use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};
use ratatui::Frame;

use crate::state::AppState;
use crate::timer::{countdown_ratio, format_countdown, is_low_time};

pub fn draw_titlebar(f: &mut Frame, area: Rect, state: &AppState) {
    let session = &state.session;
    let remaining = session.time_remaining();
    let low = is_low_time(remaining, session.budget());

    let progress = format!(
        " Question {} / {} ",
        (session.current_index() + 1).min(session.question_count()),
        session.question_count()
    );
    let score = format!(" {} pts ", session.score());
    let timer = format!(" ⏱ {} ", format_countdown(remaining));

    let timer_span = if low && state.is_open() {
        Span::styled(
            timer.clone(),
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(timer.clone(), Style::default().fg(Color::Rgb(200, 200, 120)))
    };

    let title_text = format!("[ {} ]", state.title);
    let available = area.width as usize;
    let left_len = progress.chars().count();
    let right_len = score.chars().count() + timer.chars().count();
    let title_len = title_text.chars().count();
    let center_pad = if available > title_len {
        ((available - title_len) / 2).saturating_sub(left_len)
    } else {
        0
    };
    let right_pad = available.saturating_sub(left_len + center_pad + title_len + right_len);

    let line = Line::from(vec![
        Span::styled(progress, Style::default().fg(Color::Gray)),
        Span::raw(" ".repeat(center_pad)),
        Span::styled(
            title_text,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(right_pad)),
        Span::styled(
            score,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        timer_span,
    ]);

    let widget = Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .alignment(Alignment::Left);
    f.render_widget(widget, area);
}

pub fn draw_countdown(f: &mut Frame, area: Rect, state: &AppState) {
    let session = &state.session;
    let ratio = countdown_ratio(session.time_remaining(), session.budget());
    let color = if is_low_time(session.time_remaining(), session.budget()) {
        Color::Red
    } else {
        Color::Cyan
    };

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(ratio)
        .label("");
    f.render_widget(gauge, area);
}
