//! Mock adapters for integration tests.
//!
//! Record every outbound call so tests can assert on the full command
//! history without a serial device or broker.

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::Duration;

use intersection::app::ports::{BusPort, Clock, CommandSink, LinePort, VehicleSensor};
use intersection::app::service::Controller;
use intersection::config::SignalTiming;
use intersection::error::{SensorError, TransportError};
use intersection::fsm::{Side, SideAssignment};

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Phase(String),
    Telemetry(Side, u64),
}

#[derive(Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
    /// Fail this many phase commands before succeeding.
    pub failing_phase_commands: usize,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Phase(s) => Some(s.clone()),
                SinkCall::Telemetry(..) => None,
            })
            .collect()
    }

    pub fn telemetry(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Telemetry(_, v) => Some(*v),
                SinkCall::Phase(_) => None,
            })
            .collect()
    }
}

impl CommandSink for RecordingSink {
    fn send_phase_command(&mut self, sides: &SideAssignment) -> Result<(), TransportError> {
        if self.failing_phase_commands > 0 {
            self.failing_phase_commands -= 1;
            return Err(TransportError::SerialWrite);
        }
        self.calls.push(SinkCall::Phase(sides.to_string()));
        Ok(())
    }

    fn send_telemetry(&mut self, side: Side, value: u64) -> Result<(), TransportError> {
        self.calls.push(SinkCall::Telemetry(side, value));
        Ok(())
    }
}

// ── Sensors ───────────────────────────────────────────────────

/// Replays a script of readings, then repeats the last one.
pub struct ScriptedSensor {
    script: VecDeque<Option<u32>>,
    last: Option<u32>,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn new(script: impl IntoIterator<Item = Option<u32>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: None,
        }
    }

    pub fn constant(count: u32) -> Self {
        Self::new([Some(count)])
    }
}

impl VehicleSensor for ScriptedSensor {
    fn vehicle_count(&mut self) -> Result<u32, SensorError> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last.ok_or(SensorError::Unavailable)
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Hand-advanced clock.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn since_start(&self) -> Duration {
        self.now.get()
    }
}

// ── Transports ────────────────────────────────────────────────

/// Serial link that times out for the first `fail_first` writes.
#[derive(Default)]
pub struct FlakyLink {
    pub fail_first: usize,
    pub attempts: usize,
    pub lines: Vec<String>,
}

impl LinePort for FlakyLink {
    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.attempts += 1;
        if self.attempts <= self.fail_first {
            return Err(TransportError::SerialTimeout);
        }
        self.lines.push(format!("{line}\n"));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBus {
    pub published: Vec<(String, String)>,
}

#[allow(dead_code)]
impl MemoryBus {
    pub fn payloads(&self, topic: &str) -> Vec<String> {
        self.published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl BusPort for MemoryBus {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.published.push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Started controller with default timing.
#[allow(dead_code)]
pub fn started(sink: &mut RecordingSink) -> Controller {
    let mut c = Controller::new(SignalTiming::default());
    c.start(sink);
    c
}

/// Tick once per second for `t` in `from..=to`.
#[allow(dead_code)]
pub fn run_seconds(
    controller: &mut Controller,
    from: u64,
    to: u64,
    sensor: &mut impl VehicleSensor,
    sink: &mut impl CommandSink,
) {
    for t in from..=to {
        controller.poll(Duration::from_secs(t), sensor, sink);
    }
}
