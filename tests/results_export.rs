use std::fs;

use chrono::{Local, TimeZone};
use quizclock::model::Answer;
use quizclock::persist::{build_results_yaml, QuizMeta, ScoreSink, YamlResultSink};
use quizclock::session::QuizSession;
use serde_yaml::Value;

fn finished_session() -> (quizclock::model::Quiz, quizclock::model::SessionSummary) {
    let content = fs::read_to_string("fixtures/daily_quiz.md").expect("Cannot read fixture");
    let quiz = quizclock::parser::parse_quiz(&content, "daily_quiz.md", "sha256:abc123").unwrap();

    let mut session = QuizSession::new(quiz.questions.clone()).unwrap();
    session
        .submit_answer(Some(Answer::SingleChoice("Paris".to_string())))
        .unwrap();
    session.advance().unwrap();
    session.tick(5.0);
    session.submit_answer(None).unwrap();
    session.advance().unwrap();
    session
        .submit_answer(Some(Answer::multi(["Red", "Blue"])))
        .unwrap();
    session.advance().unwrap();

    let summary = session.summary().unwrap();
    (quiz, summary)
}

#[test]
fn test_results_yaml_structure() {
    let (quiz, summary) = finished_session();
    let finished_at = Local.with_ymd_and_hms(2026, 10, 19, 10, 1, 23).unwrap();

    let yaml = build_results_yaml(&QuizMeta::from_quiz(&quiz), &summary, &finished_at).unwrap();
    let doc: Value = serde_yaml::from_str(&yaml).unwrap();

    // Quiz metadata
    assert_eq!(doc["quiz"]["title"].as_str(), Some("Daily Vibe Check"));
    assert_eq!(doc["quiz"]["source"].as_str(), Some("daily_quiz.md"));
    assert_eq!(doc["quiz"]["hash"].as_str(), Some("sha256:abc123"));
    assert!(doc["quiz"]["finished_at"]
        .as_str()
        .unwrap()
        .starts_with("2026-10-19T10:01:23"));

    // Score block
    assert_eq!(doc["score"]["final"].as_u64(), Some(100));
    assert_eq!(doc["score"]["max"].as_u64(), Some(250));
    assert_eq!(doc["score"]["correct"].as_u64(), Some(1));
    assert_eq!(doc["score"]["questions"].as_u64(), Some(3));

    let results = doc["results"].as_sequence().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["id"].as_str(), Some("q1"));
    assert_eq!(results[0]["correct"].as_bool(), Some(true));
    assert_eq!(results[0]["answer"].as_str(), Some("Paris"));
    assert_eq!(results[0]["time_remaining"].as_f64(), Some(20.0));

    // Explicit no-answer is null, not a timeout
    assert!(results[1]["answer"].is_null());
    assert_eq!(results[1]["timed_out"].as_bool(), Some(false));
    assert_eq!(results[1]["time_remaining"].as_f64(), Some(15.0));

    // Multi-choice answers are written as a sorted list
    let multi = results[2]["answer"].as_sequence().unwrap();
    let picked: Vec<&str> = multi.iter().filter_map(|v| v.as_str()).collect();
    assert_eq!(picked, vec!["Blue", "Red"]);
    assert_eq!(results[2]["awarded"].as_u64(), Some(0));
}

#[test]
fn test_yaml_sink_writes_into_results_dir() {
    let (quiz, summary) = finished_session();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("results");

    let mut sink = YamlResultSink::new(&dir, QuizMeta::from_quiz(&quiz));
    assert!(sink.written().is_none());
    sink.record(&summary).unwrap();

    let path = sink.written().unwrap().to_path_buf();
    assert!(path.starts_with(&dir));
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("daily_quiz-"));
    assert!(name.ends_with(".yaml"));

    // No temp file is left behind
    let entries: Vec<_> = fs::read_dir(&dir).unwrap().collect();
    assert_eq!(entries.len(), 1);

    let doc: Value = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["score"]["final"].as_u64(), Some(100));
}

#[test]
fn test_yaml_sink_keeps_earlier_results() {
    let (quiz, summary) = finished_session();
    let tmp = tempfile::tempdir().unwrap();

    let mut sink = YamlResultSink::new(tmp.path(), QuizMeta::from_quiz(&quiz));
    sink.record(&summary).unwrap();
    let first = sink.written().unwrap().to_path_buf();
    sink.record(&summary).unwrap();
    let second = sink.written().unwrap().to_path_buf();

    assert_ne!(first, second);
    assert!(first.exists() && second.exists());
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 2);
}
