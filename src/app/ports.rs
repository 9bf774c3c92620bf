//! Port traits: the hexagonal boundary between the controller core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (clock, vehicle sensor, serial link, bus, config file)
//! implement these traits.  The [`Controller`](super::service::Controller)
//! consumes them via generics, so the scheduler never touches a device.

use core::time::Duration;

use crate::config::ControllerConfig;
use crate::error::{ConfigError, SensorError, TransportError};
use crate::fsm::{Side, SideAssignment};

// ───────────────────────────────────────────────────────────────
// Clock (driven adapter: time source → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time since the controller started.
pub trait Clock {
    fn since_start(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Vehicle sensor (driven adapter: detector → domain)
// ───────────────────────────────────────────────────────────────

/// Vehicles currently detected on the sensored approach.
pub trait VehicleSensor {
    /// Latest count.  [`SensorError::Unavailable`] when the detector has
    /// nothing for this tick; the controller then uses 0.
    fn vehicle_count(&mut self) -> Result<u32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Command sink (driven adapter: domain → signal heads / bus)
// ───────────────────────────────────────────────────────────────

/// Where phase commands and green-time telemetry go.
pub trait CommandSink {
    /// Render and transmit the four-side assignment.  Called once per
    /// transition, never per tick.
    fn send_phase_command(&mut self, sides: &SideAssignment) -> Result<(), TransportError>;

    /// Forward `side`'s total green seconds (0 on reset).  Called only
    /// when the value for that side changes.
    fn send_telemetry(&mut self, side: Side, value: u64) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Transport ports used by the fan-out sink
// ───────────────────────────────────────────────────────────────

/// Line-oriented link to the signal heads.
pub trait LinePort {
    /// Write `line` followed by `\n`, bounded by the link's write timeout.
    fn write_line(&mut self, line: &str) -> Result<(), TransportError>;
}

/// Publish side of a publish/subscribe bus.
pub trait BusPort {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads controller configuration.
///
/// Implementations MUST return a validated config: out-of-range values
/// are rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    fn load(&self) -> Result<ControllerConfig, ConfigError>;
}
