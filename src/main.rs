use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quizclock::cli::Cli;
use quizclock::persist::{self, QuizMeta, ScoreSink, YamlResultSink};
use quizclock::provider::resolve_source;
use quizclock::session::{QuizSession, QUESTION_TIME_BUDGET};
use quizclock::state::AppState;
use quizclock::{timer, tui};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let results_dir = cli
        .results_dir
        .clone()
        .unwrap_or_else(persist::default_results_dir);

    init_logging(&cli, &results_dir)?;

    let quiz = resolve_source(&cli.path, cli.date)
        .with_context(|| format!("cannot load quiz from {}", cli.path.display()))?;

    let budget = cli
        .time_budget
        .or(quiz.frontmatter.time_budget)
        .unwrap_or(QUESTION_TIME_BUDGET);

    if cli.check {
        QuizSession::with_budget(quiz.questions.clone(), budget)?;
        persist::print_check(&quiz, budget);
        return Ok(());
    }

    if cli.tick_ms == 0 {
        bail!("--tick-ms must be greater than zero");
    }

    let session = QuizSession::with_budget(quiz.questions.clone(), budget)?;
    let state = AppState::new(&quiz, session);

    let timer_rx = timer::spawn_ticker(Duration::from_millis(cli.tick_ms));
    let state = tui::run_tui(state, timer_rx)?;

    let Some(summary) = state.summary else {
        info!("quit before completion, nothing recorded");
        return Ok(());
    };

    eprintln!(
        "Score: {} / {} ({} of {} correct)",
        summary.final_score, summary.max_score, summary.correct_count, summary.question_count
    );

    if !cli.no_save {
        let mut sink = YamlResultSink::new(&results_dir, QuizMeta::from_quiz(&quiz));
        sink.record(&summary).context("cannot save results")?;
        if let Some(path) = sink.written() {
            eprintln!("Results saved to {}", path.display());
        }
    }

    Ok(())
}

/// The terminal owns stdout while playing, so logs go to a file or, in
/// `--check` mode, to stderr.
fn init_logging(cli: &Cli, results_dir: &Path) -> Result<()> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizclock=debug"))
    };

    if cli.log {
        fs::create_dir_all(results_dir)
            .with_context(|| format!("cannot create {}", results_dir.display()))?;
        let path = results_dir.join("quizclock.log");
        let file = File::create(&path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if cli.check {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}
