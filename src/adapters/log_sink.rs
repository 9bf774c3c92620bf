//! Log-based command sink adapter.
//!
//! Implements [`CommandSink`] by writing phase commands and green-time
//! values to the logger instead of a device.  Used for `--dry-run` bench
//! runs without a serial link or broker.

use log::info;

use crate::app::ports::CommandSink;
use crate::error::TransportError;
use crate::fsm::{Side, SideAssignment};

/// Adapter that logs every outbound command.
#[derive(Debug, Default)]
pub struct LogCommandSink {
    commands: u64,
    telemetry: u64,
}

impl LogCommandSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// (phase commands, telemetry values) logged so far.
    pub fn counts(&self) -> (u64, u64) {
        (self.commands, self.telemetry)
    }
}

impl CommandSink for LogCommandSink {
    fn send_phase_command(&mut self, sides: &SideAssignment) -> Result<(), TransportError> {
        self.commands += 1;
        info!("PHASE | {}", sides);
        Ok(())
    }

    fn send_telemetry(&mut self, side: Side, value: u64) -> Result<(), TransportError> {
        self.telemetry += 1;
        info!("GREEN | side {} {}s", side, value);
        Ok(())
    }
}
