//! Collaborator traits for the cloud platform.
//!
//! The rotation core never talks to the platform itself. A backup run
//! reaches it through these two narrow interfaces, implemented against
//! EC2 in production and in memory for tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Image, ImageRequest, Instance};

/// Source of backup-tagged instances and the means to image them.
#[async_trait]
pub trait InstanceInventory: Send + Sync {
    /// List instances carrying the backup tag.
    async fn list_backup_instances(&self) -> Result<Vec<Instance>>;

    /// Create an image and return its identifier.
    async fn create_image(&self, request: &ImageRequest) -> Result<String>;
}

/// Listing and deletion of backup-tagged images.
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    /// List images carrying the backup tag.
    async fn list_backup_images(&self) -> Result<Vec<Image>>;

    /// Delete (deregister) an image.
    async fn delete_image(&self, image_id: &str) -> Result<()>;
}
