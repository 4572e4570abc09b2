//! Document reports - the persisted output of the pipeline
//!
//! Reports serialize with snake_case field names; spans carry their five
//! attributes (`text`, `category`, `confidence`, `offset`, `length`).

use crate::classifier::PassFailure;
use crate::error::Result;
use crate::types::{DetectedEntity, Span};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Result of processing one document through the full pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Report identifier (doc-<uuid>)
    pub id: String,

    pub timestamp: DateTime<Utc>,

    pub original_text: String,

    /// Clinical terms, reported but never rewritten
    pub preserved: Vec<Span>,

    /// Redacted person and date mentions
    pub medical: Vec<Span>,

    /// Redacted contact PII
    pub contact_pii: Vec<Span>,

    pub redacted_text: String,

    pub total_entity_count: usize,

    /// Sorted, distinct category names across all three groups
    pub categories: Vec<String>,

    /// Detection passes that failed; non-empty means a partial result
    #[serde(default)]
    pub failed_passes: Vec<PassFailure>,
}

impl DocumentReport {
    pub(crate) fn new(
        original_text: &str,
        preserved: Vec<Span>,
        medical: Vec<Span>,
        contact_pii: Vec<Span>,
        redacted_text: String,
        failed_passes: Vec<PassFailure>,
    ) -> Self {
        let total_entity_count = preserved.len() + medical.len() + contact_pii.len();
        let categories: BTreeSet<&str> = preserved
            .iter()
            .chain(medical.iter())
            .chain(contact_pii.iter())
            .map(|s| s.category.label())
            .collect();

        Self {
            id: format!("doc-{}", uuid::Uuid::new_v4()),
            timestamp: Utc::now(),
            original_text: original_text.to_string(),
            preserved,
            medical,
            contact_pii,
            redacted_text,
            total_entity_count,
            categories: categories.into_iter().map(str::to_string).collect(),
            failed_passes,
        }
    }

    /// Whether every detection pass succeeded
    pub fn is_complete(&self) -> bool {
        self.failed_passes.is_empty()
    }

    /// Number of spans that were replaced in the text
    pub fn redacted_count(&self) -> usize {
        self.medical.len() + self.contact_pii.len()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON, creating parent directories
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json(path.as_ref(), &self.to_json_pretty()?).await?;
        tracing::info!(document_id = %self.id, path = %path.as_ref().display(), "Report saved");
        Ok(())
    }
}

/// Result of the single-detector tagged pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedReport {
    pub timestamp: DateTime<Utc>,
    pub original_text: String,
    pub detected_entities: Vec<DetectedEntity>,
    pub redacted_text: String,
    pub entity_count: usize,
    pub categories: Vec<String>,
}

impl TaggedReport {
    pub(crate) fn new(
        original_text: &str,
        detected_entities: Vec<DetectedEntity>,
        redacted_text: String,
    ) -> Self {
        let categories: BTreeSet<String> = detected_entities
            .iter()
            .map(|e| e.category.clone())
            .collect();
        Self {
            timestamp: Utc::now(),
            original_text: original_text.to_string(),
            entity_count: detected_entities.len(),
            detected_entities,
            redacted_text,
            categories: categories.into_iter().collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json(path.as_ref(), &self.to_json_pretty()?).await
    }
}

async fn write_json(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json).await?;
    Ok(())
}
