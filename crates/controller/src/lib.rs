#![deny(unused)]
//! Backup job orchestration.
//!
//! One run images every backup-tagged instance, then rotates the image
//! set: the rotation core picks at most one image per instance to delete
//! and the job deletes them, reporting each outcome to the log sink.

pub mod job;

pub use job::{BackupJob, Clock, CreatedImage, CreationReport, Failure, RotationReport, RunReport};
