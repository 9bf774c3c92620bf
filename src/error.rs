//! Unified error types for the intersection controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be passed through the controller without allocation; adapters log
//! the underlying OS / library detail before mapping into these.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration could not be loaded, or a transport could not be
    /// brought up at startup.  Fatal.
    Config(ConfigError),
    /// A send over the serial link or the bus failed mid-run.
    Transport(TransportError),
    /// The vehicle-count source yielded no reading.
    Sensor(SensorError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Startup-time failures.  The process must not enter the control loop
/// after any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    NotFound,
    /// The config file exists but is not valid JSON for [`ControllerConfig`](crate::config::ControllerConfig).
    Parse,
    /// The config file could not be read.
    Io,
    /// A field failed range validation.  Names the field and why.
    ValidationFailed(&'static str),
    /// The serial port could not be opened.
    SerialOpenFailed,
    /// The broker did not acknowledge the initial connection.
    BrokerUnreachable,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config file not found"),
            Self::Parse => write!(f, "config file is not valid JSON"),
            Self::Io => write!(f, "config file could not be read"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::SerialOpenFailed => write!(f, "serial port could not be opened"),
            Self::BrokerUnreachable => write!(f, "broker unreachable"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Recoverable send failures.  Logged, retried for phase commands, then
/// dropped; the next tick's state is self-consistent regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Serial write returned an error.
    SerialWrite,
    /// Serial write did not complete within the configured timeout.
    SerialTimeout,
    /// The bus client rejected the publish (queue full or closed).
    PublishFailed,
    /// The transport has been shut down.
    Disconnected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SerialWrite => write!(f, "serial write failed"),
            Self::SerialTimeout => write!(f, "serial write timed out"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::Disconnected => write!(f, "transport disconnected"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No reading is available for this tick.
    Unavailable,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "no vehicle count available"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
