//! Serial link to the signal-head controller.
//!
//! Implements [`LinePort`] over the `serialport` crate.  Every write is
//! bounded by the port timeout so a wedged device cannot stall the
//! control loop.

use std::io::{self, Write};
use std::time::Duration;

use log::{info, warn};
use serialport::SerialPort;

use crate::app::ports::LinePort;
use crate::config::SerialConfig;
use crate::error::{ConfigError, TransportError};

pub struct SerialLink {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialLink {
    /// Open the configured port.  Failure is fatal at startup.
    pub fn open(config: &SerialConfig) -> Result<Self, ConfigError> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(Duration::from_millis(config.write_timeout_ms))
            .open()
            .map_err(|e| {
                warn!("Serial: cannot open {}: {}", config.port, e);
                ConfigError::SerialOpenFailed
            })?;
        info!("Serial: {} open at {} baud", config.port, config.baud_rate);
        Ok(Self {
            port,
            name: config.port.clone(),
        })
    }

    /// Flush pending output before the handle is dropped.
    pub fn close(mut self) {
        if let Err(e) = self.port.flush() {
            warn!("Serial: flush on close failed: {}", e);
        }
        info!("Serial: {} closed", self.name);
    }
}

impl LinePort for SerialLink {
    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        let result = self
            .port
            .write_all(line.as_bytes())
            .and_then(|()| self.port.write_all(b"\n"))
            .and_then(|()| self.port.flush());
        result.map_err(|e| {
            warn!("Serial: write to {} failed: {}", self.name, e);
            map_io_error(&e)
        })
    }
}

fn map_io_error(e: &io::Error) -> TransportError {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::SerialTimeout,
        io::ErrorKind::BrokenPipe | io::ErrorKind::NotConnected => TransportError::Disconnected,
        _ => TransportError::SerialWrite,
    }
}
