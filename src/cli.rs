use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::timer::DEFAULT_TICK;

#[derive(Parser, Debug)]
#[command(name = "quizclock", version, about = "Timed trivia quiz in the terminal")]
pub struct Cli {
    /// Quiz file, or directory of dated quizzes [default: .]
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Play the quiz for this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "date")]
    pub date: Option<NaiveDate>,

    /// Seconds per question, overriding the quiz file
    #[arg(long, value_name = "seconds")]
    pub time_budget: Option<f64>,

    /// Countdown tick interval in milliseconds
    #[arg(long, value_name = "ms", default_value_t = DEFAULT_TICK.as_millis() as u64)]
    pub tick_ms: u64,

    /// Where results are written [default: platform data dir]
    #[arg(long, value_name = "dir")]
    pub results_dir: Option<PathBuf>,

    /// Do not write a results file
    #[arg(long)]
    pub no_save: bool,

    /// Validate the quiz and print its questions without playing
    #[arg(long)]
    pub check: bool,

    /// Write a debug log to quizclock.log in the results directory
    #[arg(long)]
    pub log: bool,
}
