//! Progress reporting for index build steps and batch locate.
//!
//! A [`Progress`] draws an indicatif spinner or bar when the `progress`
//! feature is enabled. Finishing it logs the step's wall time at debug level
//! in either case.

use std::time::{Duration, Instant};
use tracing::debug;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

pub struct Progress {
    label: &'static str,
    started: Instant,
    #[cfg(feature = "progress")]
    bar: ProgressBar,
}

impl Progress {
    /// Spinner for one build step
    pub fn step(label: &'static str) -> Self {
        #[cfg(feature = "progress")]
        let bar = {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
                spinner.set_style(style);
            }
            spinner.set_message(label);
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        };
        Self {
            label,
            started: Instant::now(),
            #[cfg(feature = "progress")]
            bar,
        }
    }

    /// Bar counting located patterns out of `total`
    pub fn patterns(total: u64) -> Self {
        #[cfg(feature = "progress")]
        let bar = {
            let bar = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} patterns [{elapsed}]") {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        };
        #[cfg(not(feature = "progress"))]
        let _ = total;
        Self {
            label: "Locating patterns",
            started: Instant::now(),
            #[cfg(feature = "progress")]
            bar,
        }
    }

    /// Count one finished item
    #[inline]
    pub fn inc(&self) {
        #[cfg(feature = "progress")]
        self.bar.inc(1);
    }

    /// Clear the display and return the time since the step started
    pub fn finish(self) -> Duration {
        let elapsed = self.started.elapsed();
        #[cfg(feature = "progress")]
        self.bar.finish_and_clear();
        debug!(step = self.label, elapsed_ms = elapsed.as_secs_f64() * 1e3, "Step finished");
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_reports_elapsed_time() {
        let progress = Progress::patterns(3);
        for _ in 0..3 {
            progress.inc();
        }
        std::thread::sleep(Duration::from_millis(2));
        assert!(progress.finish() >= Duration::from_millis(2));
    }

    #[test]
    fn test_progress_is_shared_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Progress>();
    }
}
