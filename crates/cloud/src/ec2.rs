//! EC2 implementation of the instance inventory and image catalog.

use async_trait::async_trait;
use aws_sdk_ec2::{
    error::DisplayErrorContext,
    types::{Filter, ResourceType, Tag as Ec2Tag, TagSpecification},
    Client,
};

use rotating_imager_core::{
    config::CloudConfig,
    traits::{ImageCatalog, InstanceInventory},
    types::{Image, ImageRequest, Instance, Tag, TagFilter},
    Error, Result,
};

/// Page size for `DescribeImages`; without it the call is unpaginated.
const IMAGE_PAGE_SIZE: i32 = 1000;

/// Backup collaborators backed by the EC2 API.
pub struct Ec2Cloud {
    client: Client,
    filter: TagFilter,
}

impl Ec2Cloud {
    /// Create a client for the configured region.
    pub async fn new(config: &CloudConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let sdk_config = loader.load().await;

        Self {
            client: Client::new(&sdk_config),
            filter: config.backup_tag.clone(),
        }
    }

    /// Create with custom client (for testing/custom config).
    pub fn with_client(client: Client, filter: TagFilter) -> Self {
        Self { client, filter }
    }

    fn tag_filter(&self) -> Filter {
        Filter::builder()
            .name(format!("tag:{}", self.filter.key))
            .values(self.filter.value.clone())
            .build()
    }
}

fn to_tags(tags: &[Ec2Tag]) -> Vec<Tag> {
    tags.iter()
        .filter_map(|t| Some(Tag::new(t.key()?, t.value().unwrap_or_default())))
        .collect()
}

#[async_trait]
impl InstanceInventory for Ec2Cloud {
    async fn list_backup_instances(&self) -> Result<Vec<Instance>> {
        let mut instances = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_instances()
                .filters(self.tag_filter())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    Error::listing(format!("DescribeInstances error: {}", DisplayErrorContext(&e)))
                })?;

            for reservation in output.reservations() {
                for inst in reservation.instances() {
                    let Some(id) = inst.instance_id() else {
                        tracing::debug!("Skipping instance without id");
                        continue;
                    };
                    instances.push(Instance {
                        id: id.to_string(),
                        tags: to_tags(inst.tags()),
                    });
                }
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!(count = instances.len(), filter = %self.filter, "Listed backup instances");
        Ok(instances)
    }

    async fn create_image(&self, request: &ImageRequest) -> Result<String> {
        let mut call = self
            .client
            .create_image()
            .instance_id(&request.instance_id)
            .name(&request.name)
            .description(&request.description)
            .no_reboot(request.no_reboot);

        if !request.tags.is_empty() {
            let mut spec = TagSpecification::builder().resource_type(ResourceType::Image);
            for tag in &request.tags {
                spec = spec.tags(Ec2Tag::builder().key(&tag.key).value(&tag.value).build());
            }
            call = call.tag_specifications(spec.build());
        }

        let output = call
            .send()
            .await
            .map_err(|e| Error::cloud(format!("CreateImage error: {}", DisplayErrorContext(&e))))?;

        output
            .image_id()
            .map(str::to_string)
            .ok_or_else(|| Error::cloud("CreateImage returned no image id"))
    }
}

#[async_trait]
impl ImageCatalog for Ec2Cloud {
    async fn list_backup_images(&self) -> Result<Vec<Image>> {
        let mut images = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_images()
                .owners("self")
                .filters(self.tag_filter())
                .max_results(IMAGE_PAGE_SIZE)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    Error::listing(format!("DescribeImages error: {}", DisplayErrorContext(&e)))
                })?;

            for image in output.images() {
                let Some(id) = image.image_id() else {
                    tracing::debug!("Skipping image without id");
                    continue;
                };
                images.push(Image::new(id, image.name().unwrap_or_default()));
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!(count = images.len(), filter = %self.filter, "Listed backup images");
        Ok(images)
    }

    async fn delete_image(&self, image_id: &str) -> Result<()> {
        self.client
            .deregister_image()
            .image_id(image_id)
            .send()
            .await
            .map_err(|e| {
                Error::cloud(format!("DeregisterImage error: {}", DisplayErrorContext(&e)))
            })?;

        Ok(())
    }
}
