use std::sync::Arc;

use rotating_imager_cloud::InMemoryCloud;
use rotating_imager_controller::BackupJob;
use rotating_imager_core::{
    mocks::{RecordingLogSink, UnavailableCloud},
    traits::ImageCatalog,
    types::{Instance, Tag},
    Error, RotationPolicy, Severity,
};

// ============================================================================
// Helpers
// ============================================================================

fn backup_tags() -> Vec<Tag> {
    vec![Tag::new("Backup", "true")]
}

fn job(cloud: &Arc<InMemoryCloud>, sink: &Arc<RecordingLogSink>, copies: usize) -> BackupJob {
    BackupJob::new(
        cloud.clone(),
        cloud.clone(),
        sink.clone(),
        RotationPolicy::new(copies).unwrap(),
    )
    .with_clock(Arc::new(|| 1_700_000_000))
}

fn seed_images(cloud: &InMemoryCloud, key: &str, stamps: &[u64]) {
    for ts in stamps {
        let id = format!("ami-{}-{}", key, ts);
        cloud.add_image(&id, &format!("{}-{}", key, ts), backup_tags());
    }
}

// ============================================================================
// Rotation phase
// ============================================================================

#[tokio::test]
async fn test_rotate_deletes_oldest_and_converges() {
    let cloud = Arc::new(InMemoryCloud::new());
    let sink = Arc::new(RecordingLogSink::new());
    seed_images(&cloud, "web01", &[300, 100, 400, 200]);
    let job = job(&cloud, &sink, 3);

    let report = job.rotate().await.unwrap();
    assert_eq!(report.deleted, vec!["ami-web01-100"]);
    assert!(report.failures.is_empty());
    assert!(!cloud.has_image("ami-web01-100"));
    assert!(sink.contains("Removed ami-web01-100"));

    // Second run: the group is at the retention count.
    let report = job.rotate().await.unwrap();
    assert!(report.deleted.is_empty());
    assert_eq!(report.plan.advisories.len(), 1);
    assert_eq!(
        sink.messages_at(Severity::Warning),
        vec!["There's less than 3 images for web01. Skipping rotation."]
    );
    assert_eq!(cloud.list_backup_images().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_rotate_one_per_run_even_when_far_over() {
    let cloud = Arc::new(InMemoryCloud::new());
    let sink = Arc::new(RecordingLogSink::new());
    seed_images(
        &cloud,
        "web01",
        &[101, 102, 103, 104, 105, 106, 107, 108, 109, 110],
    );
    let job = job(&cloud, &sink, 3);

    for run in 0..7 {
        let report = job.rotate().await.unwrap();
        assert_eq!(report.deleted, vec![format!("ami-web01-{}", 101 + run)]);
    }
    let report = job.rotate().await.unwrap();
    assert!(report.deleted.is_empty());
    assert_eq!(cloud.image_count(), 3);
}

#[tokio::test]
async fn test_rotate_mixed_groups() {
    let cloud = Arc::new(InMemoryCloud::new());
    let sink = Arc::new(RecordingLogSink::new());
    seed_images(&cloud, "web01", &[100, 200, 300, 400, 500]);
    seed_images(&cloud, "db01", &[100, 200]);
    let job = job(&cloud, &sink, 3);

    let report = job.rotate().await.unwrap();
    assert_eq!(report.deleted, vec!["ami-web01-100"]);
    assert!(cloud.has_image("ami-db01-100"));
    assert!(sink.contains("images for db01. Skipping rotation."));
}

#[tokio::test]
async fn test_deletion_failure_is_per_image() {
    let cloud = Arc::new(InMemoryCloud::new());
    let sink = Arc::new(RecordingLogSink::new());
    seed_images(&cloud, "web01", &[100, 200]);
    seed_images(&cloud, "db01", &[100, 200]);
    cloud.fail_delete_for("ami-db01-100");
    let job = job(&cloud, &sink, 1);

    let report = job.rotate().await.unwrap();
    assert_eq!(report.deleted, vec!["ami-web01-100"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, "ami-db01-100");
    assert!(sink.contains("Could not deregister ami-db01-100"));
    assert!(!sink.contains("Removed ami-db01-100"));

    // The undeleted image is picked again on the next run.
    let report = job.rotate().await.unwrap();
    let pending: Vec<&str> = report.plan.deletion_set().into_iter().collect();
    assert_eq!(pending, vec!["ami-db01-100"]);
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let cloud = Arc::new(UnavailableCloud::new("DescribeImages throttled"));
    let sink = Arc::new(RecordingLogSink::new());
    let job = BackupJob::new(cloud.clone(), cloud, sink.clone(), RotationPolicy::default());

    assert!(matches!(job.rotate().await, Err(Error::Listing(_))));
    assert!(matches!(job.run().await, Err(Error::Listing(_))));
    assert!(sink.entries().is_empty());
}

// ============================================================================
// Full run
// ============================================================================

#[tokio::test]
async fn test_run_creates_then_rotates() {
    let cloud = Arc::new(InMemoryCloud::new());
    let sink = Arc::new(RecordingLogSink::new());
    cloud.add_instance(
        Instance::new("i-0web")
            .with_tag("Name", "web01")
            .with_tag("Backup", "true"),
    );
    cloud.add_instance(Instance::new("i-0tmp").with_tag("Backup", "false"));
    seed_images(&cloud, "web01", &[1600000000, 1650000000, 1690000000]);
    let job = job(&cloud, &sink, 3);

    let report = job.run().await.unwrap();

    assert_eq!(report.creation.instances_found, 1);
    assert_eq!(report.creation.created.len(), 1);
    let created = &report.creation.created[0];
    assert_eq!(created.instance_id, "i-0web");
    assert_eq!(created.name, "web01-1700000000");
    assert!(sink.contains("Scheduling image creation for web01 (i-0web)"));
    assert!(sink.contains(&format!("Created {} from web01", created.image_id)));

    // The new image pushed web01 to four, so its oldest goes.
    let rotation = report.rotation.unwrap();
    assert_eq!(rotation.deleted, vec!["ami-web01-1600000000"]);
    assert!(cloud.has_image(&created.image_id));
    assert!(sink.contains("Rotating images..."));
}

#[tokio::test]
async fn test_run_without_instances_skips_rotation() {
    let cloud = Arc::new(InMemoryCloud::new());
    let sink = Arc::new(RecordingLogSink::new());
    seed_images(&cloud, "web01", &[100, 200, 300, 400]);
    let job = job(&cloud, &sink, 3);

    let report = job.run().await.unwrap();
    assert!(report.rotation.is_none());
    assert_eq!(cloud.image_count(), 4);
    assert!(sink.contains("Could not find instances to backup (tag:Backup=true)"));
}

#[tokio::test]
async fn test_creation_failure_does_not_stop_run() {
    let cloud = Arc::new(InMemoryCloud::new());
    let sink = Arc::new(RecordingLogSink::new());
    cloud.add_instance(
        Instance::new("i-a")
            .with_tag("Name", "app")
            .with_tag("Backup", "true"),
    );
    cloud.add_instance(
        Instance::new("i-b")
            .with_tag("Name", "db")
            .with_tag("Backup", "true"),
    );
    cloud.fail_create_for("i-a");
    let job = job(&cloud, &sink, 3);

    let report = job.run().await.unwrap();
    assert_eq!(report.creation.failures.len(), 1);
    assert_eq!(report.creation.failures[0].id, "i-a");
    assert_eq!(report.creation.created.len(), 1);
    assert_eq!(report.creation.created[0].instance_id, "i-b");
    assert_eq!(sink.messages_at(Severity::Error).len(), 1);
    assert!(report.rotation.is_some());
}
