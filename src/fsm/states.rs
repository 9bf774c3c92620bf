//! Phase table rows and the green-extension arithmetic.
//!
//! Each row is two plain `fn` pointers: how long the phase must be held,
//! and which (phase, side) follows it.  No closures, no heap.
//!
//! ```text
//!  GREEN(n) ──[elapsed ≥ base (+ vehicles × extra if n sensored)]──▶ YELLOW(n)
//!  YELLOW(n) ──[elapsed ≥ yellow]──▶ GREEN(n+1)      (4 wraps to 1)
//! ```

use super::{ActivePhase, Side};
use crate::config::SignalTiming;

/// Hold time for a phase, given the active side and the latest count.
pub type RequiredSecsFn = fn(&SignalTiming, Side, u32) -> u64;

/// The (phase, side) that follows once the hold time has elapsed.
pub type NextFn = fn(Side) -> (ActivePhase, Side);

/// Static descriptor for one active-side phase.
pub struct PhaseDescriptor {
    pub phase: ActivePhase,
    pub name: &'static str,
    pub required_secs: RequiredSecsFn,
    pub next: NextFn,
}

/// Build the phase table.  Called once per scheduler.
pub fn build_phase_table() -> [PhaseDescriptor; ActivePhase::COUNT] {
    [
        // Index 0: Green
        PhaseDescriptor {
            phase: ActivePhase::Green,
            name: "GREEN",
            required_secs: green_required,
            next: green_next,
        },
        // Index 1: Yellow
        PhaseDescriptor {
            phase: ActivePhase::Yellow,
            name: "YELLOW",
            required_secs: yellow_required,
            next: yellow_next,
        },
    ]
}

/// Extra green seconds for `side`, or `None` if `side` is not sensored.
pub fn extension_secs(timing: &SignalTiming, side: Side, vehicle_count: u32) -> Option<u64> {
    (side == timing.sensored_side)
        .then(|| vehicle_count as u64 * timing.extra_secs_per_vehicle as u64)
}

pub fn green_required(timing: &SignalTiming, side: Side, vehicle_count: u32) -> u64 {
    timing.base_green_secs as u64 + extension_secs(timing, side, vehicle_count).unwrap_or(0)
}

fn green_next(side: Side) -> (ActivePhase, Side) {
    (ActivePhase::Yellow, side)
}

fn yellow_required(timing: &SignalTiming, _side: Side, _vehicle_count: u32) -> u64 {
    timing.yellow_secs as u64
}

fn yellow_next(side: Side) -> (ActivePhase, Side) {
    (ActivePhase::Green, side.next())
}
