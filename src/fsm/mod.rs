//! Table-driven signal phase state machine.
//!
//! Only the *active* side ever leaves RED.  Its cycle is two table rows:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  PhaseTable                                                   │
//! │  ┌─────────┬──────────────────────────┬─────────────────────┐ │
//! │  │ Phase   │ required_secs            │ next                │ │
//! │  ├─────────┼──────────────────────────┼─────────────────────┤ │
//! │  │ Green   │ base (+ extension if     │ (Yellow, same side) │ │
//! │  │         │ sensored side)           │                     │ │
//! │  │ Yellow  │ yellow                   │ (Green, next side)  │ │
//! │  └─────────┴──────────────────────────┴─────────────────────┘ │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick [`PhaseScheduler::on_tick`] looks up the row for the current
//! [`ActivePhase`], compares the elapsed time against `required_secs`, and
//! either stays (possibly publishing a changed green extension) or applies
//! `next` exactly once.  RED is not a state of the machine: it is what every
//! non-active side shows, so there is no (phase, side) combination without
//! a row.

pub mod context;
pub mod states;

use core::fmt;
use core::fmt::Write as _;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app::events::{OutboundEvent, TickEvents};
use crate::config::SignalTiming;
use context::ControllerState;
use states::{PhaseDescriptor, build_phase_table, extension_secs};

// ---------------------------------------------------------------------------
// Side identity
// ---------------------------------------------------------------------------

/// One approach of the intersection.  Rotation order is 1 → 2 → 3 → 4 → 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Side {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Side {
    pub const COUNT: usize = 4;

    /// All sides in rotation order.
    pub const ALL: [Side; Side::COUNT] = [Side::One, Side::Two, Side::Three, Side::Four];

    /// The side's number as printed in commands (1–4).
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Zero-based position in [`Side::ALL`].
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// The side that becomes active after this one.
    pub const fn next(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::Three,
            Self::Three => Self::Four,
            Self::Four => Self::One,
        }
    }

    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }
}

/// Rejected side number (outside 1–4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSide(pub u8);

impl fmt::Display for InvalidSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "side must be 1-4, got {}", self.0)
    }
}

impl TryFrom<u8> for Side {
    type Error = InvalidSide;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_number(n).ok_or(InvalidSide(n))
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> u8 {
        side.number()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// The lamp a side is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Green,
    Yellow,
    Red,
}

impl Phase {
    /// Wire spelling used in phase commands.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The phases the active side can be in.  RED is deliberately absent:
/// the active side leaves YELLOW by handing the right of way to the next
/// side, which is the only way a side returns to RED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActivePhase {
    Green = 0,
    Yellow = 1,
}

impl ActivePhase {
    /// Number of rows in the phase table.
    pub const COUNT: usize = 2;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn lamp(self) -> Phase {
        match self {
            Self::Green => Phase::Green,
            Self::Yellow => Phase::Yellow,
        }
    }
}

// ---------------------------------------------------------------------------
// Four-side assignment
// ---------------------------------------------------------------------------

/// Longest possible command line: `"YELLOW1 YELLOW2 YELLOW3 YELLOW4"`.
pub const COMMAND_CAPACITY: usize = 32;

/// The lamp shown on every side at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SideAssignment([Phase; Side::COUNT]);

impl SideAssignment {
    /// `active` shows `phase`, the other three show RED.
    pub fn with_active(active: Side, phase: ActivePhase) -> Self {
        let mut lamps = [Phase::Red; Side::COUNT];
        lamps[active.index()] = phase.lamp();
        Self(lamps)
    }

    pub fn phase_of(&self, side: Side) -> Phase {
        self.0[side.index()]
    }

    /// Lamps in side order 1..4.
    pub fn phases(&self) -> [Phase; Side::COUNT] {
        self.0
    }

    /// The single non-RED side, if any.
    pub fn active_side(&self) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.phase_of(*side) != Phase::Red)
    }

    /// Render as `"GREEN1 RED2 RED3 RED4"` (no line terminator).
    pub fn to_command(&self) -> heapless::String<COMMAND_CAPACITY> {
        let mut out = heapless::String::new();
        if write!(out, "{self}").is_err() {
            debug_assert!(false, "phase command exceeded {COMMAND_CAPACITY} bytes");
        }
        out
    }
}

impl fmt::Display for SideAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, side) in Side::ALL.into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", self.phase_of(side), side)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scheduler engine
// ---------------------------------------------------------------------------

/// The phase-timing state machine.
///
/// Owns the phase table and the entire [`ControllerState`].  A pure
/// function of (state, now, vehicle count): no I/O, no allocation, cannot
/// fail.
pub struct PhaseScheduler {
    /// Fixed-size table indexed by `ActivePhase as usize`.
    table: [PhaseDescriptor; ActivePhase::COUNT],
    timing: SignalTiming,
    state: ControllerState,
}

impl PhaseScheduler {
    /// Side 1 GREEN, started at t=0.
    pub fn new(timing: SignalTiming) -> Self {
        Self {
            table: build_phase_table(),
            timing,
            state: ControllerState::initial(),
        }
    }

    /// Reset to side 1 GREEN entered at whole second `now`.
    pub fn restart_at(&mut self, now: u64) {
        self.state = ControllerState {
            phase_started_at: now,
            ..ControllerState::initial()
        };
    }

    /// Advance by one tick at whole second `now`.
    ///
    /// Callers must not invoke this twice for the same `now`; the
    /// [`TickDriver`](crate::scheduler::TickDriver) enforces that.
    /// At most one transition fires per call even if `now` is late by
    /// several phases.
    pub fn on_tick(&mut self, now: u64, vehicle_count: u32) -> TickEvents {
        let mut events = TickEvents::new();
        let row = &self.table[self.state.active_phase.index()];
        let side = self.state.active_side;
        let elapsed = self.state.elapsed(now);
        let required = (row.required_secs)(&self.timing, side, vehicle_count);

        if elapsed < required {
            if self.state.active_phase == ActivePhase::Green {
                self.publish_extension(vehicle_count, &mut events);
            }
            return events;
        }

        let from = self.state.assignment();
        let (next_phase, next_side) = (row.next)(side);
        self.state.active_phase = next_phase;
        self.state.active_side = next_side;
        self.state.phase_started_at = now;
        let to = self.state.assignment();

        info!(
            "Signal transition: {} -> {} (t={}s, {} held {}s)",
            from, to, now, row.name, elapsed
        );
        push(&mut events, OutboundEvent::PhaseChange(to));

        // Leaving an extended green: zero the published green time.
        if self.state.last_published_extension.take().is_some() {
            push(&mut events, OutboundEvent::GreenTimeReset { side });
        }
        events
    }

    /// Green seconds currently required for the active side, or `None`
    /// while it is in YELLOW.
    pub fn required_green_secs(&self, vehicle_count: u32) -> Option<u64> {
        (self.state.active_phase == ActivePhase::Green).then(|| {
            states::green_required(&self.timing, self.state.active_side, vehicle_count)
        })
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn timing(&self) -> &SignalTiming {
        &self.timing
    }

    /// Lamps on all four sides right now.
    pub fn assignment(&self) -> SideAssignment {
        self.state.assignment()
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn publish_extension(&mut self, vehicle_count: u32, events: &mut TickEvents) {
        let side = self.state.active_side;
        let Some(ext) = extension_secs(&self.timing, side, vehicle_count) else {
            return;
        };
        if self.state.last_published_extension == Some(ext) {
            return;
        }
        self.state.last_published_extension = Some(ext);
        let secs = self.timing.base_green_secs as u64 + ext;
        debug!("Green extension side {side}: +{ext}s (total {secs}s)");
        push(events, OutboundEvent::GreenTime { side, secs });
    }
}

fn push(events: &mut TickEvents, event: OutboundEvent) {
    if events.push(event).is_err() {
        debug_assert!(false, "tick produced more events than TickEvents holds");
    }
}
