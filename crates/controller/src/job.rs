//! The backup job: image creation, then rotation.

use serde::Serialize;
use std::sync::Arc;

use rotating_imager_core::{
    plan_rotation,
    traits::{ImageCatalog, InstanceInventory},
    types::{ImageRequest, TagFilter},
    LogRecord, LogSink, Result, RotationPlan, RotationPolicy, Severity,
};

/// Source of the current Unix time in seconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// An image created during this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedImage {
    pub instance_id: String,
    pub image_id: String,
    pub name: String,
}

/// A per-item failure that did not abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Instance id for creation failures, image id for deletion failures.
    pub id: String,
    pub error: String,
}

/// Outcome of the image creation phase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreationReport {
    pub instances_found: usize,
    pub created: Vec<CreatedImage>,
    pub failures: Vec<Failure>,
}

/// Outcome of the rotation phase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RotationReport {
    pub plan: RotationPlan,
    pub deleted: Vec<String>,
    pub failures: Vec<Failure>,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub creation: CreationReport,
    /// `None` when no backup-tagged instances were found.
    pub rotation: Option<RotationReport>,
}

/// One scheduled backup run against the platform collaborators.
///
/// Everything runs sequentially. Only a failed listing aborts a phase;
/// failed creates and deletes are logged, recorded in the report and
/// left for the next scheduled run.
pub struct BackupJob {
    inventory: Arc<dyn InstanceInventory>,
    catalog: Arc<dyn ImageCatalog>,
    sink: Arc<dyn LogSink>,
    policy: RotationPolicy,
    filter: TagFilter,
    clock: Clock,
}

impl BackupJob {
    pub fn new(
        inventory: Arc<dyn InstanceInventory>,
        catalog: Arc<dyn ImageCatalog>,
        sink: Arc<dyn LogSink>,
        policy: RotationPolicy,
    ) -> Self {
        Self {
            inventory,
            catalog,
            sink,
            policy,
            filter: TagFilter::default(),
            clock: Arc::new(|| chrono::Utc::now().timestamp()),
        }
    }

    /// Tag filter the collaborators apply; used in log messages.
    pub fn with_filter(mut self, filter: TagFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Override the clock used to timestamp image names.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Image every backup-tagged instance.
    pub async fn create_images(&self) -> Result<CreationReport> {
        let instances = self.inventory.list_backup_instances().await?;
        let mut report = CreationReport {
            instances_found: instances.len(),
            ..Default::default()
        };

        for instance in &instances {
            let label = instance.label();
            self.sink.info(
                LogRecord::new(format!(
                    "Scheduling image creation for {} ({})",
                    label, instance.id
                ))
                .field("instance_id", instance.id.as_str())
                .into(),
            );

            let request = ImageRequest::for_instance(instance, (self.clock)());
            match self.inventory.create_image(&request).await {
                Ok(image_id) => {
                    self.sink.info(
                        LogRecord::new(format!("Created {} from {}", image_id, label))
                            .field("instance_id", instance.id.as_str())
                            .field("image_id", image_id.as_str())
                            .field("name", request.name.as_str())
                            .into(),
                    );
                    report.created.push(CreatedImage {
                        instance_id: instance.id.clone(),
                        image_id,
                        name: request.name,
                    });
                }
                Err(e) => {
                    self.sink.error(
                        LogRecord::new(format!("Could not create image for {}: {}", label, e))
                            .field("instance_id", instance.id.as_str())
                            .into(),
                    );
                    report.failures.push(Failure {
                        id: instance.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            instances = report.instances_found,
            created = report.created.len(),
            failed = report.failures.len(),
            "Image creation phase finished"
        );
        Ok(report)
    }

    /// Delete this run's rotation candidates.
    pub async fn rotate(&self) -> Result<RotationReport> {
        let images = self.catalog.list_backup_images().await?;
        let plan = plan_rotation(&images, &self.policy);

        for advisory in &plan.advisories {
            self.sink.warn(advisory.to_string().into());
        }

        let mut report = RotationReport::default();
        for image_id in plan.deletion_set() {
            match self.catalog.delete_image(image_id).await {
                Ok(()) => {
                    self.sink.info(
                        LogRecord::new(format!("Removed {}", image_id))
                            .field("image_id", image_id)
                            .into(),
                    );
                    report.deleted.push(image_id.to_string());
                }
                Err(e) => {
                    self.sink.warn(
                        LogRecord::new(format!("Could not deregister {}: {}", image_id, e))
                            .field("image_id", image_id)
                            .into(),
                    );
                    report.failures.push(Failure {
                        id: image_id.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            images = images.len(),
            deleted = report.deleted.len(),
            failed = report.failures.len(),
            skipped = plan.advisories.len(),
            "Rotation phase finished"
        );
        report.plan = plan;
        Ok(report)
    }

    /// Full run: create images, then rotate.
    ///
    /// Rotation is skipped when there is nothing tagged for backup.
    pub async fn run(&self) -> Result<RunReport> {
        let creation = self.create_images().await?;

        if creation.instances_found == 0 {
            self.sink.info(
                format!("Could not find instances to backup ({})", self.filter).into(),
            );
            return Ok(RunReport {
                creation,
                rotation: None,
            });
        }

        self.sink.log(Severity::Info, "Rotating images...".into());
        let rotation = self.rotate().await?;

        Ok(RunReport {
            creation,
            rotation: Some(rotation),
        })
    }
}
