use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Cadence the host clock ticks at unless told otherwise.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Below this fraction of the budget the countdown is shown as urgent.
pub const LOW_TIME_RATIO: f64 = 0.3;

#[derive(Debug, Clone)]
pub enum TimerEvent {
    /// Wall-clock time measured since the previous tick.
    Tick(Duration),
}

/// Starts a thread that ticks every `interval` until the receiver is dropped.
pub fn spawn_ticker(interval: Duration) -> mpsc::Receiver<TimerEvent> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut last = Instant::now();

        loop {
            thread::sleep(interval);

            let now = Instant::now();
            let elapsed = now.duration_since(last);
            last = now;

            if tx.send(TimerEvent::Tick(elapsed)).is_err() {
                break;
            }
        }
    });

    rx
}

/// Whole seconds left, rounded up, e.g. `"20s"`.
pub fn format_countdown(remaining: f64) -> String {
    if remaining <= 0.0 {
        return "0s".to_string();
    }
    format!("{}s", remaining.ceil() as u64)
}

pub fn countdown_ratio(remaining: f64, budget: f64) -> f64 {
    if budget <= 0.0 {
        return 0.0;
    }
    (remaining / budget).clamp(0.0, 1.0)
}

pub fn is_low_time(remaining: f64, budget: f64) -> bool {
    countdown_ratio(remaining, budget) < LOW_TIME_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_rounds_up() {
        assert_eq!(format_countdown(20.0), "20s");
        assert_eq!(format_countdown(9.01), "10s");
        assert_eq!(format_countdown(0.2), "1s");
        assert_eq!(format_countdown(0.0), "0s");
        assert_eq!(format_countdown(-3.0), "0s");
    }

    #[test]
    fn ratio_is_clamped() {
        assert_eq!(countdown_ratio(10.0, 20.0), 0.5);
        assert_eq!(countdown_ratio(30.0, 20.0), 1.0);
        assert_eq!(countdown_ratio(5.0, 0.0), 0.0);
    }

    #[test]
    fn low_time_threshold() {
        assert!(!is_low_time(20.0, 20.0));
        assert!(!is_low_time(6.0, 20.0));
        assert!(is_low_time(5.9, 20.0));
    }

    #[test]
    fn ticker_reports_elapsed_time() {
        let rx = spawn_ticker(Duration::from_millis(10));
        for _ in 0..3 {
            let TimerEvent::Tick(elapsed) = rx
                .recv_timeout(Duration::from_secs(2))
                .expect("ticker stopped");
            assert!(elapsed >= Duration::from_millis(10));
        }
    }
}
