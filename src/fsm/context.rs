//! The scheduler's entire mutable state.
//!
//! `ControllerState` is created once at startup, mutated only inside
//! [`PhaseScheduler::on_tick`](super::PhaseScheduler::on_tick), and
//! dropped on shutdown.  Nothing is persisted.

use super::{ActivePhase, Side, SideAssignment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    /// The one side currently allowed to be non-RED.
    pub active_side: Side,
    /// What the active side is showing.
    pub active_phase: ActivePhase,
    /// Whole second at which `active_phase` was entered.  Written once per
    /// phase entry.
    pub phase_started_at: u64,
    /// Extension (seconds) last reported for the sensored side's current
    /// green, `None` until the first report of that green.
    pub last_published_extension: Option<u64>,
}

impl ControllerState {
    /// Side 1 GREEN from t=0.
    pub fn initial() -> Self {
        Self {
            active_side: Side::One,
            active_phase: ActivePhase::Green,
            phase_started_at: 0,
            last_published_extension: None,
        }
    }

    /// Seconds spent in the current phase.  A clock reading older than the
    /// phase entry counts as zero.
    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.phase_started_at)
    }

    pub fn assignment(&self) -> SideAssignment {
        SideAssignment::with_active(self.active_side, self.active_phase)
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::initial()
    }
}
