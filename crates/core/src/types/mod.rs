//! Core type definitions for the rotating imager.
//!
//! Images and instances are observed from the cloud platform and never
//! mutated here; the rotation core only reads and classifies them.

pub mod image;
pub mod instance;

pub use image::*;
pub use instance::*;
