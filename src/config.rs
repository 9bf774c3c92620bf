//! Controller configuration parameters
//!
//! All tunable parameters for the intersection controller.
//! Every field has a default, so a partial JSON file only needs to name
//! the values it overrides.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fsm::Side;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Phase durations and the green-extension policy.
    pub timing: SignalTiming,
    /// Signal-head serial link.
    pub serial: SerialConfig,
    /// Publish/subscribe bus.
    pub mqtt: MqttConfig,
    /// Clock sampling cadence of the control loop (milliseconds).
    pub poll_interval_ms: u64,
}

/// Phase timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalTiming {
    /// Green duration before any extension (seconds)
    pub base_green_secs: u32,
    /// Yellow duration, every side (seconds)
    pub yellow_secs: u32,
    /// Extra green granted per detected vehicle (seconds)
    pub extra_secs_per_vehicle: u32,
    /// The only side whose green is extended by the vehicle count
    pub sensored_side: Side,
}

/// Serial link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// OS device name, e.g. `/dev/ttyUSB0` or `COM3`
    pub port: String,
    pub baud_rate: u32,
    /// Upper bound on a single line write (milliseconds)
    pub write_timeout_ms: u64,
    /// Extra attempts for a failed phase command (telemetry is never retried)
    pub phase_command_retries: u8,
}

/// Publish/subscribe bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    /// Topic carrying the four-side phase command
    pub phase_topic: String,
    /// Green-time topics are this prefix followed by the side number,
    /// e.g. `TrafficTimeSide1`
    pub green_time_topic_prefix: String,
    pub keep_alive_secs: u64,
    /// How long to wait for the broker's initial acknowledgement (milliseconds)
    pub connect_timeout_ms: u64,
    /// Outgoing request queue depth; a full queue drops the publish
    pub channel_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            timing: SignalTiming::default(),
            serial: SerialConfig::default(),
            mqtt: MqttConfig::default(),
            poll_interval_ms: 50, // 20 Hz sampling
        }
    }
}

impl Default for SignalTiming {
    fn default() -> Self {
        Self {
            base_green_secs: 10,
            yellow_secs: 3,
            extra_secs_per_vehicle: 1,
            sensored_side: Side::One,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            write_timeout_ms: 1000,
            phase_command_retries: 1,
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "intersection-controller".to_string(),
            phase_topic: "TrafficTopic".to_string(),
            green_time_topic_prefix: "TrafficTimeSide".to_string(),
            keep_alive_secs: 60,
            connect_timeout_ms: 5000,
            channel_capacity: 16,
        }
    }
}

impl ControllerConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;

        if self.serial.port.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("serial.port must not be empty"));
        }
        if self.serial.baud_rate == 0 {
            return Err(ConfigError::ValidationFailed("serial.baud_rate must be > 0"));
        }
        if self.serial.write_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "serial.write_timeout_ms must be > 0",
            ));
        }

        if self.mqtt.host.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("mqtt.host must not be empty"));
        }
        if self.mqtt.client_id.is_empty() {
            return Err(ConfigError::ValidationFailed("mqtt.client_id must not be empty"));
        }
        if !is_publish_topic(&self.mqtt.phase_topic) {
            return Err(ConfigError::ValidationFailed(
                "mqtt.phase_topic must be non-empty and free of wildcards",
            ));
        }
        if !is_publish_topic(&self.mqtt.green_time_topic_prefix) {
            return Err(ConfigError::ValidationFailed(
                "mqtt.green_time_topic_prefix must be non-empty and free of wildcards",
            ));
        }
        if Side::ALL
            .into_iter()
            .any(|side| self.mqtt.green_time_topic(side) == self.mqtt.phase_topic)
        {
            return Err(ConfigError::ValidationFailed(
                "mqtt.phase_topic must differ from every green-time topic",
            ));
        }
        if self.mqtt.connect_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "mqtt.connect_timeout_ms must be > 0",
            ));
        }
        if self.mqtt.channel_capacity == 0 {
            return Err(ConfigError::ValidationFailed(
                "mqtt.channel_capacity must be > 0",
            ));
        }

        if self.poll_interval_ms == 0 || self.poll_interval_ms >= 1000 {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be in 1..1000",
            ));
        }
        Ok(())
    }
}

impl MqttConfig {
    /// Topic carrying `side`'s total green seconds.
    pub fn green_time_topic(&self, side: Side) -> String {
        format!("{}{}", self.green_time_topic_prefix, side)
    }
}

impl SignalTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_green_secs == 0 {
            return Err(ConfigError::ValidationFailed("timing.base_green_secs must be > 0"));
        }
        if self.yellow_secs == 0 {
            return Err(ConfigError::ValidationFailed("timing.yellow_secs must be > 0"));
        }
        Ok(())
    }

    /// Full four-side cycle length with no extension.
    pub fn base_cycle_secs(&self) -> u64 {
        Side::COUNT as u64 * (self.base_green_secs as u64 + self.yellow_secs as u64)
    }
}

/// MQTT publish topics may not be empty or contain the `+` / `#` wildcards.
fn is_publish_topic(topic: &str) -> bool {
    !topic.is_empty() && !topic.contains(['+', '#', '\0'])
}
