use std::collections::BTreeSet;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::error::LoadError;
use crate::model::*;

pub const DEFAULT_POINTS: u32 = 100;

const MULTI_MARKER: &str = "(Multi)";

pub fn parse_quiz(content: &str, source: &str, hash: &str) -> Result<Quiz, LoadError> {
    let (frontmatter, body) = split_frontmatter(content)?;
    let fm: Frontmatter = serde_yaml::from_str(&frontmatter)
        .map_err(|e| LoadError::Parse(format!("invalid frontmatter: {}", e)))?;

    let (title, preamble, questions) = parse_body(&body)?;

    let title = fm.title.clone().unwrap_or(title);

    Ok(Quiz {
        frontmatter: fm,
        title,
        preamble,
        questions,
        source: source.to_string(),
        hash: hash.to_string(),
    })
}

fn split_frontmatter(content: &str) -> Result<(String, String), LoadError> {
    let trimmed = content.trim_start();
    if !trimmed.starts_with("---") {
        return Err(LoadError::Parse(
            "quiz file must start with YAML frontmatter (---)".to_string(),
        ));
    }

    let after_first = &trimmed[3..];
    let end_pos = after_first
        .find("\n---")
        .ok_or_else(|| LoadError::Parse("no closing --- for frontmatter".to_string()))?;

    let fm = after_first[..end_pos].trim().to_string();
    let body = after_first[end_pos + 4..].to_string();

    Ok((fm, body))
}

/// Everything collected between two `##` headings.
#[derive(Default)]
struct Draft {
    heading: String,
    body: Vec<String>,
    options: Vec<(String, bool)>,
    meta: Vec<(String, String)>,
    image: Option<String>,
}

fn parse_body(body: &str) -> Result<(String, Vec<String>, Vec<Question>), LoadError> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut title = String::new();
    let mut preamble: Vec<String> = Vec::new();
    let mut questions: Vec<Question> = Vec::new();

    let mut draft: Option<Draft> = None;
    let mut in_h1 = false;
    let mut in_h2 = false;
    let mut in_blockquote = false;
    let mut blockquote_text = String::new();
    let mut in_list_item = false;
    let mut list_item_text = String::new();
    let mut task_list_checked: Option<bool> = None;
    let mut in_paragraph = false;
    let mut paragraph_text = String::new();
    let mut in_image = false;

    for event in Parser::new_ext(body, opts) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => match level {
                HeadingLevel::H1 => in_h1 = true,
                HeadingLevel::H2 => {
                    if let Some(done) = draft.take() {
                        questions.push(finalize_question(done)?);
                    }
                    draft = Some(Draft::default());
                    in_h2 = true;
                }
                _ => {}
            },
            Event::End(TagEnd::Heading(level)) => match level {
                HeadingLevel::H1 => in_h1 = false,
                HeadingLevel::H2 => in_h2 = false,
                _ => {}
            },
            Event::Start(Tag::BlockQuote(_)) => {
                in_blockquote = true;
                blockquote_text.clear();
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                in_blockquote = false;
                if let Some(d) = draft.as_mut() {
                    for line in blockquote_text.lines() {
                        if let Some((key, value)) = line.split_once(':') {
                            d.meta
                                .push((key.trim().to_lowercase(), value.trim().to_string()));
                        }
                    }
                }
            }
            Event::Start(Tag::Item) => {
                in_list_item = true;
                list_item_text.clear();
                task_list_checked = None;
            }
            Event::End(TagEnd::Item) => {
                in_list_item = false;
                if let Some(d) = draft.as_mut() {
                    let text = list_item_text.trim().to_string();
                    match task_list_checked {
                        Some(checked) => d.options.push((text, checked)),
                        None if !text.is_empty() => d.body.push(format!("• {}", text)),
                        None => {}
                    }
                }
                task_list_checked = None;
            }
            Event::TaskListMarker(checked) => {
                task_list_checked = Some(checked);
            }
            Event::Start(Tag::Paragraph) => {
                in_paragraph = true;
                paragraph_text.clear();
            }
            Event::End(TagEnd::Paragraph) => {
                in_paragraph = false;
                if in_blockquote {
                    blockquote_text.push('\n');
                } else if !in_list_item {
                    let text = paragraph_text.trim().to_string();
                    if !text.is_empty() {
                        match draft.as_mut() {
                            Some(d) => d.body.push(text),
                            None => preamble.push(text),
                        }
                    }
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                in_image = true;
                if let Some(d) = draft.as_mut() {
                    d.image = Some(dest_url.to_string());
                }
            }
            Event::End(TagEnd::Image) => {
                in_image = false;
            }
            Event::Text(text) => {
                if in_image {
                    // alt text is not part of the prompt
                } else if in_h1 {
                    title = text.to_string();
                } else if in_h2 {
                    if let Some(d) = draft.as_mut() {
                        d.heading.push_str(&text);
                    }
                } else if in_blockquote {
                    blockquote_text.push_str(&text);
                } else if in_list_item {
                    list_item_text.push_str(&text);
                } else if in_paragraph {
                    paragraph_text.push_str(&text);
                }
            }
            Event::Code(code) => {
                let c = format!("`{}`", code);
                if in_list_item {
                    list_item_text.push_str(&c);
                } else if in_paragraph && !in_blockquote {
                    paragraph_text.push_str(&c);
                } else if in_h2 {
                    if let Some(d) = draft.as_mut() {
                        d.heading.push_str(&c);
                    }
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if in_blockquote {
                    blockquote_text.push('\n');
                } else if in_list_item {
                    list_item_text.push(' ');
                } else if in_paragraph {
                    paragraph_text.push(' ');
                }
            }
            _ => {}
        }
    }

    if let Some(done) = draft.take() {
        questions.push(finalize_question(done)?);
    }

    Ok((title, preamble, questions))
}

fn finalize_question(draft: Draft) -> Result<Question, LoadError> {
    let (number, heading) = parse_h2_title(&draft.heading)?;
    let is_multi = heading.contains(MULTI_MARKER);
    let heading = heading.replace(MULTI_MARKER, "").trim().to_string();

    let meta = |key: &str| {
        draft
            .meta
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    let id = meta("id")
        .map(str::to_string)
        .unwrap_or_else(|| format!("q{}", number));

    let points = match meta("points") {
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            LoadError::Parse(format!("question {}: invalid points {:?}", number, raw))
        })?,
        None => DEFAULT_POINTS,
    };

    let media = ["image", "audio", "video"]
        .iter()
        .find_map(|key| {
            meta(*key).map(|url| Media {
                kind: MediaKind::from_key(*key).unwrap_or(MediaKind::Image),
                url: url.to_string(),
            })
        })
        .or_else(|| {
            draft.image.as_ref().map(|url| Media {
                kind: MediaKind::Image,
                url: url.clone(),
            })
        });

    let text = if draft.body.is_empty() {
        heading
    } else {
        draft.body.join("\n\n")
    };

    let (kind, options, correct_answer) = if draft.options.is_empty() {
        let answer = meta("answer").unwrap_or_default().to_string();
        (
            QuestionKind::FreeText,
            Vec::new(),
            CorrectAnswer::Single(answer),
        )
    } else {
        let options: Vec<String> = draft.options.iter().map(|(t, _)| t.clone()).collect();
        let checked: BTreeSet<String> = draft
            .options
            .iter()
            .filter(|(_, c)| *c)
            .map(|(t, _)| t.clone())
            .collect();

        if is_multi {
            (QuestionKind::MultiChoice, options, CorrectAnswer::Set(checked))
        } else {
            if checked.len() != 1 {
                return Err(LoadError::Parse(format!(
                    "question {}: single-choice needs exactly one checked option, found {}",
                    number,
                    checked.len()
                )));
            }
            let answer = checked.into_iter().next().unwrap_or_default();
            (QuestionKind::SingleChoice, options, CorrectAnswer::Single(answer))
        }
    };

    Ok(Question {
        id,
        text,
        kind,
        options,
        correct_answer,
        points,
        media,
    })
}

fn parse_h2_title(text: &str) -> Result<(u32, String), LoadError> {
    let trimmed = text.trim();
    // Expected format: "1. Title text"
    if let Some(dot_pos) = trimmed.find('.') {
        let num_str = trimmed[..dot_pos].trim();
        let title = trimmed[dot_pos + 1..].trim().to_string();
        let number: u32 = num_str.parse().map_err(|_| {
            LoadError::Parse(format!("invalid question number in heading: {}", trimmed))
        })?;
        Ok((number, title))
    } else {
        Err(LoadError::Parse(format!(
            "question heading must be in format '## N. Title', got: {}",
            trimmed
        )))
    }
}
