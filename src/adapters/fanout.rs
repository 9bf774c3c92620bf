//! Fan-out command sink.
//!
//! Implements [`CommandSink`] on top of a [`LinePort`] (serial link to the
//! signal heads) and a [`BusPort`] (publish/subscribe bus).
//!
//! | Output            | Serial                  | Bus topic          |
//! |-------------------|-------------------------|--------------------|
//! | phase command     | `GREEN1 RED2 RED3 RED4\n` | `phase_topic`      |
//! | green-time value  | (none)                  | `green_time_topic_prefix` + side |
//!
//! Phase commands get `1 + retries` serial attempts; the bus is best-effort
//! and never retried.

use log::{error, warn};

use crate::app::ports::{BusPort, CommandSink, LinePort};
use crate::config::{MqttConfig, SerialConfig};
use crate::error::TransportError;
use crate::fsm::{Side, SideAssignment};

pub struct FanoutSink<L, B> {
    link: L,
    bus: B,
    phase_topic: String,
    /// Indexed by `Side::index()`.
    green_time_topics: [String; Side::COUNT],
    retries: u8,
}

impl<L: LinePort, B: BusPort> FanoutSink<L, B> {
    pub fn new(link: L, bus: B, serial: &SerialConfig, mqtt: &MqttConfig) -> Self {
        Self {
            link,
            bus,
            phase_topic: mqtt.phase_topic.clone(),
            green_time_topics: Side::ALL.map(|side| mqtt.green_time_topic(side)),
            retries: serial.phase_command_retries,
        }
    }

    /// Hand the transports back for shutdown.
    pub fn into_parts(self) -> (L, B) {
        (self.link, self.bus)
    }

    fn write_with_retry(&mut self, line: &str) -> Result<(), TransportError> {
        let attempts = u32::from(self.retries) + 1;
        let mut last = TransportError::SerialWrite;
        for attempt in 1..=attempts {
            match self.link.write_line(line) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("Serial: '{}' attempt {}/{} failed: {}", line, attempt, attempts, e);
                    last = e;
                }
            }
        }
        error!("Serial: '{}' not delivered after {} attempts", line, attempts);
        Err(last)
    }
}

impl<L: LinePort, B: BusPort> CommandSink for FanoutSink<L, B> {
    fn send_phase_command(&mut self, sides: &SideAssignment) -> Result<(), TransportError> {
        let command = sides.to_command();
        let serial = self.write_with_retry(&command);
        let bus = self.bus.publish(&self.phase_topic, &command);
        // Serial is the safety-relevant path; report it first.
        serial.and(bus)
    }

    fn send_telemetry(&mut self, side: Side, value: u64) -> Result<(), TransportError> {
        self.bus
            .publish(&self.green_time_topics[side.index()], &value.to_string())
    }
}
