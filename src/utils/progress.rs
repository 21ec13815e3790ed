//! Progress tracking for long-running fetches.
//!
//! The page aggregation learns its total from the first response, so the
//! reporter allows the total to be set after construction. The reported
//! fraction is capped at 1.0 and is 1.0 for a zero total.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress reporter with optional terminal output.
///
/// Supports quiet mode (no output); counters are atomic so clones share
/// state.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    /// Name of the operation being tracked
    name: String,

    /// Total units of work (0 while unknown)
    total: Arc<AtomicUsize>,

    /// Current progress
    current: Arc<AtomicUsize>,

    /// Start time for calculating ETA
    start_time: Instant,

    /// Whether to show progress output
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// - `name`: description of the operation
    /// - `total`: total units of work (0 for not-yet-known)
    pub fn new(name: &str, total: usize) -> Self {
        Self {
            name: name.to_string(),
            total: Arc::new(AtomicUsize::new(total)),
            current: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
            quiet: std::env::var("SCOPUS_SCOUT_QUIET").is_ok(),
        }
    }

    /// Create a quiet reporter that doesn't output anything
    pub fn quiet(name: &str, total: usize) -> Self {
        Self {
            name: name.to_string(),
            total: Arc::new(AtomicUsize::new(total)),
            current: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
            quiet: true,
        }
    }

    /// Update the total once it is known (or when the server revises it)
    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
    }

    /// Increment progress by one unit
    pub fn inc(&self) {
        self.inc_by(1);
    }

    /// Increment progress by multiple units
    pub fn inc_by(&self, delta: usize) {
        let new_value = self.current.fetch_add(delta, Ordering::SeqCst) + delta;

        if !self.quiet && new_value % 10 == 0 {
            self.print_progress(new_value);
        }
    }

    /// Set the current progress to a specific value
    pub fn set(&self, value: usize) {
        self.current.store(value, Ordering::SeqCst);

        if !self.quiet {
            self.print_progress(value);
        }
    }

    /// Completed fraction, capped at 1.0; a zero total counts as done.
    pub fn fraction(&self) -> f64 {
        let total = self.total.load(Ordering::SeqCst);
        if total == 0 {
            return 1.0;
        }
        let current = self.current.load(Ordering::SeqCst);
        (current as f64 / total as f64).min(1.0)
    }

    /// Print current progress
    fn print_progress(&self, current: usize) {
        let elapsed = self.start_time.elapsed();
        let total = self.total.load(Ordering::SeqCst);

        if total > 0 {
            let percent = self.fraction() * 100.0;
            let eta = self.estimate_eta(current, total);

            print!(
                "\r{}: [{:>3.0}%] {}/{} ({} elapsed, ETA: {})",
                self.name,
                percent,
                current,
                total,
                Self::format_duration(elapsed),
                Self::format_duration(eta)
            );
        } else {
            let dots = Self::loading_dots(current);
            print!(
                "\r{}: {} ({} elapsed)",
                self.name,
                dots,
                Self::format_duration(elapsed)
            );
        }

        if total > 0 && current >= total {
            println!();
        } else {
            use std::io::Write;
            let _ = std::io::stdout().flush();
        }
    }

    /// Estimate time remaining
    fn estimate_eta(&self, current: usize, total: usize) -> Duration {
        if current == 0 {
            return Duration::ZERO;
        }

        let elapsed = self.start_time.elapsed();
        let per_unit_secs = elapsed.as_secs_f64() / current as f64;
        let remaining = total.saturating_sub(current);

        Duration::from_secs((per_unit_secs * remaining as f64) as u64)
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();

        if secs >= 60 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}s", secs)
        }
    }

    /// Generate loading dots for indeterminate progress
    fn loading_dots(count: usize) -> String {
        let dots = count % 5;
        format!("{}{}", ".".repeat(dots), " ".repeat(4 - dots))
    }

    /// Finish the progress and print final stats
    pub fn finish(&self) {
        let current = self.current.load(Ordering::SeqCst);
        let total = self.total.load(Ordering::SeqCst);
        let elapsed = self.start_time.elapsed();

        if !self.quiet {
            if total > 0 {
                println!(
                    "{}: completed {}/{} in {:?} ({:.1} items/sec)",
                    self.name,
                    current,
                    total,
                    elapsed,
                    current as f64 / elapsed.as_secs_f64().max(0.001)
                );
            } else {
                println!("{}: completed {} items in {:?}", self.name, current, elapsed);
            }
        }
    }

    /// Get the current progress count
    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// Check if the operation is complete
    pub fn is_done(&self) -> bool {
        let current = self.current.load(Ordering::SeqCst);
        let total = self.total.load(Ordering::SeqCst);
        total > 0 && current >= total
    }
}
