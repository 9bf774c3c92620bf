//! Tick driver.
//!
//! Turns clock samples taken at the frame rate of the upstream detection
//! loop (sub-second, irregular) into a strictly once-per-second tick
//! stream for the [`PhaseScheduler`](crate::fsm::PhaseScheduler).
//!
//! ```text
//!  clock sample ──▶ floor to whole second ──▶ same as last? ──yes──▶ drop
//!                                                 │
//!                                                 no
//!                                                 ▼
//!                                        remember, emit tick(now)
//! ```
//!
//! There is no timer thread: accuracy is bounded by how often the caller
//! samples, which is plenty for whole-second phase timing.

use core::time::Duration;

use log::trace;

/// Once-per-second dedup over raw clock samples.
#[derive(Debug, Clone, Default)]
pub struct TickDriver {
    last_second_seen: Option<u64>,
    /// Samples discarded because their second had already ticked.
    discarded: u64,
}

impl TickDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one clock sample.  Returns `Some(second)` exactly once for each
    /// distinct whole second observed, `None` for repeats.
    pub fn sample(&mut self, since_start: Duration) -> Option<u64> {
        let second = since_start.as_secs();
        if self.last_second_seen == Some(second) {
            self.discarded += 1;
            return None;
        }
        if let Some(prev) = self.last_second_seen {
            if second > prev + 1 {
                trace!("TickDriver: skipped {} second(s) before t={}", second - prev - 1, second);
            }
        }
        self.last_second_seen = Some(second);
        Some(second)
    }

    pub fn last_second_seen(&self) -> Option<u64> {
        self.last_second_seen
    }

    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}
