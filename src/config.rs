//! Redactor configuration
//!
//! Configuration is written in HCL (JSON is accepted as well). Every
//! section and field has a default, so an empty file is a valid config:
//!
//! ```hcl
//! classifier {
//!   language                  = "en"
//!   date_confidence_threshold = 0.95
//!   detector_timeout_secs     = 30
//! }
//!
//! service {
//!   api_version      = "2023-04-01"
//!   poll_interval_ms = 1000
//! }
//!
//! batch {
//!   concurrency = 4
//! }
//! ```

use crate::error::{RedactError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedactorConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl RedactorConfig {
    /// Parse configuration from an HCL string, auto-detecting JSON
    pub fn from_hcl(content: &str) -> Result<Self> {
        let config: Self = if content.trim_start().starts_with('{') {
            serde_json::from_str(content)?
        } else {
            hcl::from_str(content)
                .map_err(|e| RedactError::Config(format!("Failed to parse config: {}", e)))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        tracing::info!(path = %path.display(), "Loading redactor config");
        Self::from_hcl(&content)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let threshold = self.classifier.date_confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RedactError::Config(format!(
                "date_confidence_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.classifier.detector_timeout_secs == 0 {
            return Err(RedactError::Config(
                "detector_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.classifier.language.trim().is_empty() {
            return Err(RedactError::Config("language must not be empty".to_string()));
        }
        if self.batch.concurrency == 0 {
            return Err(RedactError::Config(
                "batch concurrency must be greater than zero".to_string(),
            ));
        }
        if self.service.poll_interval_ms == 0 {
            return Err(RedactError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Entity classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Language hint sent to the general and PII detectors
    pub language: String,

    /// DateTime spans must score strictly above this to be redacted
    pub date_confidence_threshold: f64,

    /// Words marking a DateTime span as a duration (matched as
    /// case-insensitive substrings)
    pub duration_words: Vec<String>,

    /// Upper bound for a single detector call
    pub detector_timeout_secs: u64,
}

impl ClassifierConfig {
    pub fn detector_timeout(&self) -> Duration {
        Duration::from_secs(self.detector_timeout_secs)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            date_confidence_threshold: 0.95,
            duration_words: default_duration_words(),
            detector_timeout_secs: 30,
        }
    }
}

/// Default duration vocabulary
pub fn default_duration_words() -> Vec<String> {
    [
        "day", "days", "week", "weeks", "month", "months", "year", "years", "hour", "hours",
        "minute", "minutes",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}

/// Language service client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// REST API version query parameter
    pub api_version: String,

    /// Model version requested for every task
    pub model_version: String,

    /// Delay between polls of a healthcare analysis job
    pub poll_interval_ms: u64,

    /// Credential name holding the service endpoint
    pub endpoint_credential: String,

    /// Credential name holding the subscription key
    pub key_credential: String,
}

impl ServiceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_version: "2023-04-01".to_string(),
            model_version: "latest".to_string(),
            poll_interval_ms: 1000,
            endpoint_credential: "LANGUAGE-ENDPOINT".to_string(),
            key_credential: "LANGUAGE-KEY".to_string(),
        }
    }
}

/// Batch processing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of documents processed concurrently
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}
