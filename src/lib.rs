//! Four-way intersection controller library.
//!
//! Exposes the pure-logic modules (phase scheduler, tick driver,
//! controller service) for integration testing, plus the adapters the
//! binary wires together.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod scheduler;
