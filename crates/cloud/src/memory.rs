//! In-memory cloud platform using DashMap.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use rotating_imager_core::{
    traits::{ImageCatalog, InstanceInventory},
    types::{Image, ImageRequest, Instance, Tag, TagFilter},
    Error, Result,
};

/// Stored image with its tags.
#[derive(Debug, Clone)]
struct StoredImage {
    name: String,
    tags: Vec<Tag>,
    /// Insertion sequence, used to list images in creation order.
    seq: u64,
}

/// In-memory platform holding instances and images.
///
/// Listing applies the same tag filter the EC2 adapter sends to the API.
/// Individual instances or images can be marked to fail, to exercise
/// per-item error handling in the job.
#[derive(Debug)]
pub struct InMemoryCloud {
    filter: TagFilter,
    instances: DashMap<String, Instance>,
    images: DashMap<String, StoredImage>,
    failing_creates: DashSet<String>,
    failing_deletes: DashSet<String>,
    next_id: AtomicU64,
}

impl InMemoryCloud {
    /// Create an empty platform using the default backup tag.
    pub fn new() -> Self {
        Self::with_filter(TagFilter::default())
    }

    pub fn with_filter(filter: TagFilter) -> Self {
        Self {
            filter,
            instances: DashMap::new(),
            images: DashMap::new(),
            failing_creates: DashSet::new(),
            failing_deletes: DashSet::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn add_instance(&self, instance: Instance) {
        self.instances.insert(instance.id.clone(), instance);
    }

    /// Seed an image directly, bypassing creation.
    pub fn add_image(&self, id: &str, name: &str, tags: Vec<Tag>) {
        let seq = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.images.insert(
            id.to_string(),
            StoredImage {
                name: name.to_string(),
                tags,
                seq,
            },
        );
    }

    /// Make `create_image` fail for this instance.
    pub fn fail_create_for(&self, instance_id: &str) {
        self.failing_creates.insert(instance_id.to_string());
    }

    /// Make `delete_image` fail for this image.
    pub fn fail_delete_for(&self, image_id: &str) {
        self.failing_deletes.insert(image_id.to_string());
    }

    pub fn has_image(&self, image_id: &str) -> bool {
        self.images.contains_key(image_id)
    }

    /// Number of stored images, tagged or not.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

impl Default for InMemoryCloud {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstanceInventory for InMemoryCloud {
    async fn list_backup_instances(&self) -> Result<Vec<Instance>> {
        let mut instances: Vec<Instance> = self
            .instances
            .iter()
            .filter(|r| self.filter.matches(&r.value().tags))
            .map(|r| r.value().clone())
            .collect();
        instances.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(instances)
    }

    async fn create_image(&self, request: &ImageRequest) -> Result<String> {
        if !self.instances.contains_key(&request.instance_id) {
            return Err(Error::cloud(format!(
                "instance {} does not exist",
                request.instance_id
            )));
        }
        if self.failing_creates.contains(&request.instance_id) {
            return Err(Error::cloud(format!(
                "image creation rejected for {}",
                request.instance_id
            )));
        }

        let seq = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("ami-{:08x}", seq);
        self.images.insert(
            id.clone(),
            StoredImage {
                name: request.name.clone(),
                tags: request.tags.clone(),
                seq,
            },
        );
        tracing::debug!(image_id = %id, name = %request.name, "Created in-memory image");
        Ok(id)
    }
}

#[async_trait]
impl ImageCatalog for InMemoryCloud {
    async fn list_backup_images(&self) -> Result<Vec<Image>> {
        let mut images: Vec<(u64, Image)> = self
            .images
            .iter()
            .filter(|r| self.filter.matches(&r.value().tags))
            .map(|r| (r.value().seq, Image::new(r.key().clone(), r.value().name.clone())))
            .collect();
        images.sort_by_key(|(seq, _)| *seq);
        Ok(images.into_iter().map(|(_, image)| image).collect())
    }

    async fn delete_image(&self, image_id: &str) -> Result<()> {
        if self.failing_deletes.contains(image_id) {
            return Err(Error::cloud(format!("image {} is in use", image_id)));
        }
        self.images
            .remove(image_id)
            .map(|_| ())
            .ok_or_else(|| Error::image_not_found(image_id))
    }
}
