//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the controller against
//! mock adapters.  No serial port or broker is required.

mod controller_tests;
mod mock_io;
mod scenario_tests;
