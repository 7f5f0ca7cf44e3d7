#![deny(unused)]
//! Telemetry for the rotating imager.
//!
//! This crate provides:
//! - Subscriber setup (text or JSON output, optional OTLP export)
//! - A `LogSink` that forwards run log entries to `tracing`

pub mod sink;
pub mod tracing_layer;

pub use sink::TracingLogSink;
pub use tracing_layer::{configure_tracing, shutdown_tracing};
