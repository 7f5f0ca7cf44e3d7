//! Retention and rotation of backup images.
//!
//! Given a flat image listing, images are grouped by the instance key
//! encoded in their names, and each group holding more than `copies`
//! images gives up exactly its oldest image. The planner is a pure
//! function of the listing and the policy; deleting the selected images
//! and reporting on them is left to the caller.

pub mod grouper;
pub mod parser;
pub mod selector;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::Image;
use crate::{Error, Result};

pub use grouper::{group_images, GroupEntry, RetentionGroups};
pub use parser::{parse_name, ParsedName, NAME_SEPARATOR};
pub use selector::{select_for_rotation, Advisory, Selection};

/// Default number of images kept per instance.
pub const DEFAULT_COPIES: usize = 3;

/// How many of the most recent images to keep per instance key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRotationPolicy")]
pub struct RotationPolicy {
    copies: usize,
}

/// Unvalidated wire form of `RotationPolicy`.
#[derive(Deserialize)]
struct RawRotationPolicy {
    copies: usize,
}

impl TryFrom<RawRotationPolicy> for RotationPolicy {
    type Error = Error;

    fn try_from(raw: RawRotationPolicy) -> Result<Self> {
        Self::new(raw.copies)
    }
}

impl RotationPolicy {
    /// Create a policy; `copies` must be positive.
    pub fn new(copies: usize) -> Result<Self> {
        if copies == 0 {
            return Err(Error::invalid_config("copies must be at least 1"));
        }
        Ok(Self { copies })
    }

    pub fn copies(&self) -> usize {
        self.copies
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            copies: DEFAULT_COPIES,
        }
    }
}

/// An image selected for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletion {
    pub instance_key: String,
    pub image_id: String,
    pub ordering_key: String,
}

/// Result of planning one rotation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPlan {
    /// At most one deletion per instance key, in instance-key order.
    pub deletions: Vec<Deletion>,
    /// Groups left untouched, in instance-key order.
    pub advisories: Vec<Advisory>,
}

impl RotationPlan {
    /// Identifiers to delete, without duplicates.
    pub fn deletion_set(&self) -> BTreeSet<&str> {
        self.deletions.iter().map(|d| d.image_id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty()
    }
}

/// Plan this run's deletions for a full image listing.
pub fn plan_rotation(images: &[Image], policy: &RotationPolicy) -> RotationPlan {
    let groups = group_images(images);
    let mut plan = RotationPlan::default();

    for (instance_key, group) in &groups {
        match select_for_rotation(instance_key, group, policy.copies()) {
            Selection::Skip(advisory) => plan.advisories.push(advisory),
            Selection::Delete(entry) => plan.deletions.push(Deletion {
                instance_key: instance_key.clone(),
                image_id: entry.image_id.clone(),
                ordering_key: entry.ordering_key.clone(),
            }),
        }
    }

    plan
}
