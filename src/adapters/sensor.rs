//! Vehicle-count sources.
//!
//! The detector itself lives upstream; these adapters only carry its
//! integer output into the controller.
//!
//! - [`LineFeedSensor`]: one count per text line (stdin in production),
//!   read on a background thread so the control loop never blocks on it.
//!   A `q` / `quit` line requests shutdown.
//! - [`FixedVehicleSensor`]: constant reading for bench runs.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use log::{info, warn};

use crate::app::ports::VehicleSensor;
use crate::error::SensorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedMessage {
    Count(u32),
    Invalid,
}

/// Latest-value sensor fed by a line-oriented reader.
pub struct LineFeedSensor {
    rx: Receiver<FeedMessage>,
    latest: Option<u32>,
    closed: bool,
}

impl LineFeedSensor {
    /// Count feed from the process's standard input.
    pub fn stdin(stop: Arc<AtomicBool>) -> Self {
        Self::spawn(std::io::BufReader::new(std::io::stdin()), stop)
    }

    /// Start a reader thread over `reader`.
    pub fn spawn<R>(reader: R, stop: Arc<AtomicBool>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("vehicle-feed".into())
            .spawn(move || {
                for line in reader.lines() {
                    let Ok(line) = line else { break };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
                        info!("Vehicle feed: stop requested");
                        stop.store(true, Ordering::SeqCst);
                        break;
                    }
                    let msg = line.parse().map_or(FeedMessage::Invalid, FeedMessage::Count);
                    if tx.send(msg).is_err() {
                        break; // Sensor dropped.
                    }
                }
            });

        let closed = match spawned {
            Ok(_) => false,
            Err(e) => {
                warn!("Vehicle feed thread failed to start: {}", e);
                true
            }
        };
        Self {
            rx,
            latest: None,
            closed,
        }
    }

    fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(FeedMessage::Count(n)) => self.latest = Some(n),
                Ok(FeedMessage::Invalid) => {
                    warn!("Vehicle feed: ignoring malformed line");
                    self.latest = None;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.closed {
                        warn!("Vehicle feed closed");
                    }
                    self.closed = true;
                    self.latest = None;
                    break;
                }
            }
        }
    }
}

impl VehicleSensor for LineFeedSensor {
    fn vehicle_count(&mut self) -> Result<u32, SensorError> {
        if !self.closed {
            self.drain();
        }
        self.latest.ok_or(SensorError::Unavailable)
    }
}

/// Always reports the same count.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedVehicleSensor(pub u32);

impl VehicleSensor for FixedVehicleSensor {
    fn vehicle_count(&mut self) -> Result<u32, SensorError> {
        Ok(self.0)
    }
}
