#![deny(unused)]
//! Core types, traits, and error definitions for the rotating imager.
//!
//! This crate holds the retention/rotation core, which is pure and
//! performs no I/O, together with the collaborator traits that the cloud
//! adapters implement and the job controller drives.

pub mod config;
pub mod error;
pub mod log;
pub mod mocks;
pub mod rotation;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use log::{LogEntry, LogRecord, LogSink, Severity};
pub use rotation::{plan_rotation, RotationPlan, RotationPolicy};
pub use traits::*;
pub use types::*;
