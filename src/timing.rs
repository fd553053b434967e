//! Per-package timing.

use std::time::{Duration, Instant};

/// Measures how long one package took to collect.
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Start a new timer for the named package.
    pub fn start(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finish the timer and print the elapsed time.
    pub fn finish(self) {
        println!("  [{}] {}", format_elapsed(self.elapsed()), self.name);
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_elapsed(Duration::from_secs(90)), "1.5m");
    }
}
