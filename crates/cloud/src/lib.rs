#![deny(unused)]
//! Cloud adapters for the rotating imager.
//!
//! Implementations of `InstanceInventory` and `ImageCatalog`: EC2 for
//! production runs and an in-memory platform for tests and local runs.

pub mod ec2;
pub mod memory;

pub use ec2::Ec2Cloud;
pub use memory::InMemoryCloud;
