//! Controller service, the hexagonal core.
//!
//! [`Controller`] owns the tick driver and the phase scheduler.  All I/O
//! flows through port traits injected at call sites, so the whole service
//! runs against mock adapters in tests.
//!
//! ```text
//!  Clock ─────────▶ ┌──────────────────────────┐
//!                   │        Controller         │ ──▶ CommandSink
//!  VehicleSensor ─▶ │ TickDriver · Scheduler    │
//!                   └──────────────────────────┘
//! ```

use core::time::Duration;

use log::{debug, error, info, warn};

use crate::config::SignalTiming;
use crate::fsm::{Phase, PhaseScheduler, Side, SideAssignment};
use crate::scheduler::TickDriver;

use super::events::OutboundEvent;
use super::ports::{CommandSink, VehicleSensor};

/// Running counters, logged at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Scheduler ticks executed.
    pub ticks: u64,
    /// Phase changes emitted.
    pub transitions: u64,
    /// Times the right of way came back round to side 1.
    pub cycles_completed: u64,
    /// Phase commands the sink failed to deliver.
    pub dropped_commands: u64,
    /// Telemetry values the sink failed to deliver.
    pub dropped_telemetry: u64,
    /// Ticks where the sensor had no reading.
    pub sensor_gaps: u64,
}

/// The controller orchestrates tick dedup, scheduling, and emission.
pub struct Controller {
    scheduler: PhaseScheduler,
    ticks: TickDriver,
    /// Last green-time value the sink accepted, per side.
    last_telemetry: [Option<u64>; Side::COUNT],
    stats: ControllerStats,
}

impl Controller {
    /// Does **not** send anything; call [`start`](Self::start) next.
    pub fn new(timing: SignalTiming) -> Self {
        Self {
            scheduler: PhaseScheduler::new(timing),
            ticks: TickDriver::new(),
            last_telemetry: [None; Side::COUNT],
            stats: ControllerStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the signal heads into the initial assignment (side 1 GREEN),
    /// timed from t=0.
    pub fn start(&mut self, sink: &mut impl CommandSink) {
        self.start_at(Duration::ZERO, sink);
    }

    /// Like [`start`](Self::start), but side 1's first GREEN is timed from
    /// the clock sample `since_start`, so time spent bringing transports
    /// up does not count against it.
    pub fn start_at(&mut self, since_start: Duration, sink: &mut impl CommandSink) {
        let now = since_start.as_secs();
        self.scheduler.restart_at(now);
        let initial = self.scheduler.assignment();
        info!(
            "Controller started at t={}s: {} (sensored side {})",
            now,
            initial,
            self.scheduler.timing().sensored_side
        );
        self.send_phase(&initial, sink);
    }

    // ── Per-sample orchestration ──────────────────────────────

    /// Feed one clock sample.  Runs a scheduler tick only when the sample
    /// falls in a new whole second; returns that second if it did.
    pub fn poll(
        &mut self,
        since_start: Duration,
        sensor: &mut impl VehicleSensor,
        sink: &mut impl CommandSink,
    ) -> Option<u64> {
        let now = self.ticks.sample(since_start)?;
        self.tick(now, sensor, sink);
        Some(now)
    }

    fn tick(&mut self, now: u64, sensor: &mut impl VehicleSensor, sink: &mut impl CommandSink) {
        self.stats.ticks += 1;

        let vehicles = match sensor.vehicle_count() {
            Ok(n) => n,
            Err(e) => {
                self.stats.sensor_gaps += 1;
                debug!("t={}s: {}, using 0 vehicles", now, e);
                0
            }
        };

        for event in self.scheduler.on_tick(now, vehicles) {
            self.dispatch(event, sink);
        }
    }

    fn dispatch(&mut self, event: OutboundEvent, sink: &mut impl CommandSink) {
        match event {
            OutboundEvent::PhaseChange(assignment) => {
                self.stats.transitions += 1;
                if assignment.active_side() == Some(Side::One)
                    && assignment.phase_of(Side::One) == Phase::Green
                {
                    self.stats.cycles_completed += 1;
                    debug!("Cycle {} complete", self.stats.cycles_completed);
                }
                self.send_phase(&assignment, sink);
            }
            OutboundEvent::GreenTime { .. } | OutboundEvent::GreenTimeReset { .. } => {
                if let Some((side, value)) = event.telemetry() {
                    self.send_telemetry(side, value, sink);
                }
            }
        }
    }

    fn send_phase(&mut self, assignment: &SideAssignment, sink: &mut impl CommandSink) {
        if let Err(e) = sink.send_phase_command(assignment) {
            self.stats.dropped_commands += 1;
            error!("Phase command '{}' not fully delivered: {}", assignment, e);
        }
    }

    fn send_telemetry(&mut self, side: Side, value: u64, sink: &mut impl CommandSink) {
        let last = &mut self.last_telemetry[side.index()];
        if *last == Some(value) {
            return;
        }
        match sink.send_telemetry(side, value) {
            Ok(()) => {
                debug!("Green time side {} published: {}s", side, value);
                *last = Some(value);
            }
            Err(e) => {
                self.stats.dropped_telemetry += 1;
                warn!("Green time side {} {}s dropped: {}", side, value, e);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Lamps on all four sides right now.
    pub fn assignment(&self) -> SideAssignment {
        self.scheduler.assignment()
    }

    pub fn scheduler(&self) -> &PhaseScheduler {
        &self.scheduler
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    /// Clock samples discarded by the once-per-second dedup.
    pub fn discarded_samples(&self) -> u64 {
        self.ticks.discarded()
    }
}
