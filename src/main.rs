#![deny(unused)]
//! Rotating imager - scheduled EC2 image backups with count-based rotation.
//!
//! Each invocation images every instance tagged for backup, then deletes
//! the oldest image of every instance holding more than the configured
//! number of copies. Invoke it from a scheduler (cron, EventBridge, a
//! Kubernetes CronJob); it keeps no state between runs.

use std::sync::Arc;

use rotating_imager_cloud::Ec2Cloud;
use rotating_imager_controller::BackupJob;
use rotating_imager_core::config::AppConfig;
use rotating_imager_telemetry::TracingLogSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    rotating_imager_telemetry::configure_tracing(&config.telemetry)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        region = %config.cloud.region,
        copies = config.rotation.copies,
        filter = %config.cloud.backup_tag,
        "Starting rotating imager"
    );

    let result = run(&config).await;
    rotating_imager_telemetry::shutdown_tracing();
    result
}

async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let cloud = Arc::new(Ec2Cloud::new(&config.cloud).await);
    let job = BackupJob::new(
        cloud.clone(),
        cloud,
        Arc::new(TracingLogSink::new()),
        config.rotation_policy()?,
    )
    .with_filter(config.cloud.backup_tag.clone());

    let report = job.run().await?;

    let (deleted, delete_failures) = report
        .rotation
        .as_ref()
        .map(|r| (r.deleted.len(), r.failures.len()))
        .unwrap_or((0, 0));
    tracing::info!(
        instances = report.creation.instances_found,
        created = report.creation.created.len(),
        create_failures = report.creation.failures.len(),
        deleted,
        delete_failures,
        "Run finished"
    );

    Ok(())
}
