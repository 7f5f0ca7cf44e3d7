//! Mock implementations of core traits for testing.
//!
//! `RecordingLogSink` captures everything a run reports; `UnavailableCloud`
//! fails every call, standing in for an unreachable platform API.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::{
    log::{LogEntry, LogSink, Severity},
    traits::{ImageCatalog, InstanceInventory},
    types::{Image, ImageRequest, Instance},
    Error, Result,
};

// =============================================================================
// Mock Log Sink
// =============================================================================

/// Log sink that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct RecordingLogSink {
    entries: Mutex<Vec<(Severity, LogEntry)>>,
}

impl RecordingLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> Vec<(Severity, LogEntry)> {
        self.entries.lock().unwrap().clone()
    }

    /// Messages logged at exactly the given severity.
    pub fn messages_at(&self, severity: Severity) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, e)| e.message().to_string())
            .collect()
    }

    /// Whether any entry's message contains the given text.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|(_, e)| e.message().contains(needle))
    }
}

impl LogSink for RecordingLogSink {
    fn log(&self, severity: Severity, entry: LogEntry) {
        self.entries.lock().unwrap().push((severity, entry));
    }
}

// =============================================================================
// Mock Cloud
// =============================================================================

/// Cloud collaborator whose every call fails.
#[derive(Debug, Clone)]
pub struct UnavailableCloud {
    reason: String,
}

impl UnavailableCloud {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl InstanceInventory for UnavailableCloud {
    async fn list_backup_instances(&self) -> Result<Vec<Instance>> {
        Err(Error::listing(self.reason.clone()))
    }

    async fn create_image(&self, _request: &ImageRequest) -> Result<String> {
        Err(Error::cloud(self.reason.clone()))
    }
}

#[async_trait]
impl ImageCatalog for UnavailableCloud {
    async fn list_backup_images(&self) -> Result<Vec<Image>> {
        Err(Error::listing(self.reason.clone()))
    }

    async fn delete_image(&self, _image_id: &str) -> Result<()> {
        Err(Error::cloud(self.reason.clone()))
    }
}
