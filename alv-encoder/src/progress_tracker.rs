//! Per-frame progress reporting with ETA estimation

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Thread-safe progress tracker that rewrites a single stdout line
pub struct ProgressTracker {
    total: u64,
    processed: AtomicU64,
    start_time: Instant,
    label: String,
    quiet: bool,
}

impl ProgressTracker {
    /// Creates a new progress tracker
    pub fn new(total: u64, label: &str) -> Self {
        Self {
            total,
            processed: AtomicU64::new(0),
            start_time: Instant::now(),
            label: label.to_string(),
            quiet: false,
        }
    }

    /// Counts frames without printing anything
    #[cfg(test)]
    fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    #[cfg(test)]
    fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Counts one finished frame and prints the progress line
    pub fn increment_and_report(&self) {
        let current = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if self.quiet {
            return;
        }

        let line = self.format_line(current, self.start_time.elapsed().as_secs_f64());
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\r{line}");
        if current >= self.total {
            let _ = writeln!(stdout);
        }
        let _ = stdout.flush();
    }

    fn format_line(&self, current: u64, elapsed_secs: f64) -> String {
        let percent = if self.total > 0 {
            current as f64 / self.total as f64 * 100.0
        } else {
            100.0
        };

        let timing = if current >= self.total {
            format!("completed in {}", format_duration(elapsed_secs))
        } else {
            let rate = current as f64 / elapsed_secs.max(f64::EPSILON);
            let remaining = (self.total - current) as f64 / rate;
            format!("ETA: {}", format_duration(remaining))
        };

        format!(
            "{} : {:.2}% [{}/{}] - {}",
            self.label, percent, current, self.total, timing
        )
    }
}

/// Formats seconds into a human-readable duration string
fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor() as u64;
        format!("{}m {:.0}s", mins, secs - mins as f64 * 60.0)
    } else {
        let hours = (secs / 3600.0).floor() as u64;
        let mins = ((secs - hours as f64 * 3600.0) / 60.0).floor() as u64;
        let rest = secs - hours as f64 * 3600.0 - mins as f64 * 60.0;
        format!("{}h {}m {:.0}s", hours, mins, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(4.5), "4.5s");
        assert_eq!(format_duration(75.0), "1m 15s");
        assert_eq!(format_duration(3723.0), "1h 2m 3s");
    }

    #[test]
    fn test_progress_line() {
        let tracker = ProgressTracker::new(3, "progress");
        assert_eq!(
            tracker.format_line(1, 2.0),
            "progress : 33.33% [1/3] - ETA: 4.0s"
        );
        assert_eq!(
            tracker.format_line(3, 6.0),
            "progress : 100.00% [3/3] - completed in 6.0s"
        );
    }

    #[test]
    fn test_counts_across_threads() {
        let tracker = ProgressTracker::new(8, "progress").quiet();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    tracker.increment_and_report();
                    tracker.increment_and_report();
                });
            }
        });
        assert_eq!(tracker.processed(), 8);
    }
}
