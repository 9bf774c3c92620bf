//! Outbound events.
//!
//! The [`PhaseScheduler`](crate::fsm::PhaseScheduler) returns these from
//! each tick; the [`Controller`](super::service::Controller) forwards them
//! to the [`CommandSink`](super::ports::CommandSink) port.

use crate::fsm::{Side, SideAssignment};

/// Most events a single tick can produce (a phase change plus a
/// green-time reset).
pub const MAX_EVENTS_PER_TICK: usize = 2;

/// Events produced by one tick, in emission order.
pub type TickEvents = heapless::Vec<OutboundEvent, MAX_EVENTS_PER_TICK>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundEvent {
    /// The lamps changed; carries the new assignment for all four sides.
    PhaseChange(SideAssignment),

    /// The sensored side's total green (base + extension) changed.
    GreenTime { side: Side, secs: u64 },

    /// The sensored side left GREEN; its published green time drops to 0.
    GreenTimeReset { side: Side },
}

impl OutboundEvent {
    /// Side and scalar for that side's green-time topic, if this is a
    /// telemetry event.
    pub fn telemetry(&self) -> Option<(Side, u64)> {
        match self {
            Self::PhaseChange(_) => None,
            Self::GreenTime { side, secs } => Some((*side, *secs)),
            Self::GreenTimeReset { side } => Some((*side, 0)),
        }
    }
}
