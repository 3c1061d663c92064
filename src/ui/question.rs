use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::model::{CorrectAnswer, MediaKind, Question, QuestionKind};
use crate::state::{AppState, OptionMark};
use crate::ui::markdown::markdown_to_lines;

pub fn draw_question(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(question) = state.current_question() else {
        return;
    };

    let mut lines: Vec<Line> = Vec::new();

    let kind_hint = match question.kind {
        QuestionKind::FreeText => "type your answer",
        QuestionKind::SingleChoice => "pick one",
        QuestionKind::MultiChoice => "pick all that apply",
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("{} pts", question.points),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ·  {}", kind_hint),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    lines.push(Line::from(""));

    lines.extend(markdown_to_lines(&question.text));

    if let Some(media) = &question.media {
        let icon = match media.kind {
            MediaKind::Image => "🖼",
            MediaKind::Audio => "♪",
            MediaKind::Video => "▶",
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} {} ", icon, media.kind.label()),
                Style::default().fg(Color::Magenta),
            ),
            Span::styled(
                media.url.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]));
        lines.push(Line::from(""));
    }

    match question.kind {
        QuestionKind::SingleChoice | QuestionKind::MultiChoice => {
            lines.extend(choice_lines(question, state));
        }
        QuestionKind::FreeText => {
            lines.extend(text_input_lines(question, state));
        }
    }

    lines.push(Line::from(""));
    lines.extend(feedback_lines(state));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let widget = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn choice_lines(question: &Question, state: &AppState) -> Vec<Line<'static>> {
    let multi = question.kind == QuestionKind::MultiChoice;

    question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let label = (b'a' + i as u8) as char;
            let mark = state.option_mark(i);
            let ticked = state.selected.contains(&i);
            let marker = match (multi, ticked) {
                (true, true) => "[x]",
                (true, false) => "[ ]",
                (false, true) => "(●)",
                (false, false) => "( )",
            };

            let (style, suffix) = match mark {
                OptionMark::Plain if state.is_revealed() => {
                    (Style::default().fg(Color::DarkGray), "")
                }
                OptionMark::Plain => (Style::default(), ""),
                OptionMark::Selected => (
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                    "",
                ),
                OptionMark::Correct => (
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                    "  ✓",
                ),
                OptionMark::Wrong => (Style::default().fg(Color::Red), "  ✗"),
                OptionMark::Missed => (Style::default().fg(Color::Yellow), "  (missed)"),
            };

            let cursor = if i == state.choice_cursor && state.is_open() {
                "› "
            } else {
                "  "
            };

            Line::from(vec![
                Span::styled(cursor.to_string(), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{} {}. ", marker, label), style),
                Span::styled(format!("{}{}", option, suffix), style),
            ])
        })
        .collect()
}

fn text_input_lines(question: &Question, state: &AppState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let input_style = if state.is_open() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![Span::styled("  > ".to_string(), Style::default().fg(Color::Cyan))];
    if state.is_open() {
        let (before, after) = state.text_input.split_at(state.text_cursor);
        let mut rest = after.chars();
        let at = rest.next().map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
        spans.push(Span::styled(before.to_string(), input_style));
        spans.push(Span::styled(
            at,
            Style::default().fg(Color::Black).bg(Color::White),
        ));
        spans.push(Span::styled(rest.as_str().to_string(), input_style));
    } else {
        spans.push(Span::styled(state.text_input.clone(), input_style));
    }
    lines.push(Line::from(spans));

    if state.is_revealed() {
        if let CorrectAnswer::Single(answer) = &question.correct_answer {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  Correct answer: ", Style::default().fg(Color::Gray)),
                Span::styled(
                    answer.clone(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }
    }

    lines
}

fn feedback_lines(state: &AppState) -> Vec<Line<'static>> {
    let Some(result) = state.session.last_result() else {
        return Vec::new();
    };

    let headline = if result.timed_out {
        Span::styled(
            "  ⏱ Time's up, no points",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else if result.is_correct {
        Span::styled(
            format!("  ✓ Correct! +{} pts", result.awarded),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            "  ✗ Wrong answer, no points",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    };

    let next = if state.session.is_last_question() {
        "  [Enter] Finish quiz"
    } else {
        "  [Enter] Next question"
    };

    vec![
        Line::from(headline),
        Line::from(""),
        Line::from(Span::styled(next, Style::default().fg(Color::DarkGray))),
    ]
}
