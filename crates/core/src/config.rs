use config::{Config, Environment, File};
use serde::Deserialize;

use crate::rotation::{RotationPolicy, DEFAULT_COPIES};
use crate::types::TagFilter;
use crate::{Error, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub rotation: RotationConfig,
    pub cloud: CloudConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RotationConfig {
    /// Images kept per instance before the oldest is rotated out.
    pub copies: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CloudConfig {
    pub region: String,
    pub endpoint_url: Option<String>,
    pub backup_tag: TagFilter,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub json_logs: bool,
    pub service_name: String,
}

impl AppConfig {
    /// Load configuration from files and `ROTATOR__*` environment variables.
    pub fn load() -> Result<Self> {
        let env = std::env::var("ROTATOR_ENV").unwrap_or_else(|_| "production".into());

        let s = Config::builder()
            .set_default("rotation.copies", DEFAULT_COPIES as i64)?
            .set_default("cloud.region", "us-west-2")?
            .set_default("cloud.backup_tag.key", "Backup")?
            .set_default("cloud.backup_tag.value", "true")?
            .set_default("telemetry.json_logs", false)?
            .set_default("telemetry.service_name", "rotating-imager")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map ROTATOR__ROTATION__COPIES=5 to rotation.copies
            .add_source(Environment::with_prefix("ROTATOR").separator("__"))
            .build()?;

        let cfg: Self = s.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the job cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.rotation.copies == 0 {
            return Err(Error::invalid_config("rotation.copies must be at least 1"));
        }
        if self.cloud.region.trim().is_empty() {
            return Err(Error::invalid_config("cloud.region must not be empty"));
        }
        if self.cloud.backup_tag.key.trim().is_empty() {
            return Err(Error::invalid_config("cloud.backup_tag.key must not be empty"));
        }
        Ok(())
    }

    pub fn rotation_policy(&self) -> Result<RotationPolicy> {
        RotationPolicy::new(self.rotation.copies)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rotation: RotationConfig {
                copies: DEFAULT_COPIES,
            },
            cloud: CloudConfig {
                region: "us-west-2".into(),
                endpoint_url: None,
                backup_tag: TagFilter::default(),
            },
            telemetry: TelemetryConfig {
                json_logs: false,
                service_name: "rotating-imager".into(),
            },
        }
    }
}
