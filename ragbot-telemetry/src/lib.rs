//! Logging for ragbot.
//!
//! - [`init_telemetry`], [`init_with_filter`] and [`init_json`] install a
//!   global `tracing` subscriber for binaries.
//! - [`CapturedEvents`] records events in memory so tests can assert on what
//!   was logged.

mod capture;
mod init;

pub use capture::{CaptureLayer, CapturedEvent, CapturedEvents};
pub use init::{TelemetryError, init_json, init_telemetry, init_with_filter};
