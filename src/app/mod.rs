//! Controller core: pure domain logic, zero I/O.
//!
//! Tick orchestration and event emission for the intersection controller.
//! All interaction with the clock, the vehicle detector, the serial link
//! and the bus happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real devices.

pub mod events;
pub mod ports;
pub mod service;
