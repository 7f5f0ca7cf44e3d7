use serde::{Deserialize, Serialize};

use super::{Instance, Tag};
use crate::rotation::parse_name;

/// A machine image (disk snapshot) as reported by the image listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Platform-assigned identifier (e.g. `ami-0abc...`).
    pub id: String,

    /// Human-assigned name, `<instance-key>-...-<ordering-key>`.
    pub name: String,
}

impl Image {
    /// Create a new image record.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Grouping key derived from the name.
    pub fn instance_key(&self) -> &str {
        parse_name(&self.name).instance_key
    }

    /// Ranking key derived from the name, compared as a raw string.
    pub fn ordering_key(&self) -> &str {
        parse_name(&self.name).ordering_key
    }
}

/// Request to create a new image from an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Instance to image.
    pub instance_id: String,
    /// Image name, `<label>-<unix seconds>`.
    pub name: String,
    /// Image description.
    pub description: String,
    /// Create the image without rebooting the instance.
    pub no_reboot: bool,
    /// Tags applied to the new image.
    pub tags: Vec<Tag>,
}

impl ImageRequest {
    /// Build the backup request for an instance at the given Unix time.
    ///
    /// Tags under the reserved `aws:` prefix are not copied; the platform
    /// refuses them on create.
    pub fn for_instance(instance: &Instance, unix_secs: i64) -> Self {
        let label = instance.label();
        Self {
            instance_id: instance.id.clone(),
            name: format!("{}-{}", label, unix_secs),
            description: format!("{} image", label),
            no_reboot: true,
            tags: instance
                .tags
                .iter()
                .filter(|t| !t.is_reserved())
                .cloned()
                .collect(),
        }
    }
}
