//! Redactor - the document-level pipeline
//!
//! ```text
//! text → EntityClassifier ─┬─ preserved ───────────────────────────┐
//!                          ├─ medical ─────┐                       ├→ DocumentReport
//!                          └─ contact_pii ─┴→ resolve → redact ────┘
//! ```

use crate::classifier::EntityClassifier;
use crate::config::{BatchConfig, ClassifierConfig};
use crate::detector::PiiEntityDetector;
use crate::engine;
use crate::error::{DetectorError, Result};
use crate::report::{DocumentReport, TaggedReport};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Document-level redaction pipeline
///
/// Holds no per-document state: one `Redactor` can process any number of
/// documents, concurrently or not.
pub struct Redactor {
    classifier: EntityClassifier,
    batch: BatchConfig,
}

impl Redactor {
    pub fn new(classifier: EntityClassifier) -> Self {
        Self {
            classifier,
            batch: BatchConfig::default(),
        }
    }

    pub fn with_batch_config(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }

    /// Classify, resolve overlaps and redact one document.
    ///
    /// Always returns a report; failed detection passes are listed in
    /// `failed_passes` and contribute no spans.
    pub async fn process_document(&self, text: &str) -> DocumentReport {
        let classification = self.classifier.classify(text).await;

        let (medical, contact_pii) =
            engine::resolve_overlaps(&classification.medical, &classification.contact_pii);
        let discarded = classification.medical.len() + classification.contact_pii.len()
            - medical.len()
            - contact_pii.len();

        let redacted = engine::redact(text, &medical, &contact_pii);

        let report = DocumentReport::new(
            text,
            classification.preserved,
            medical,
            contact_pii,
            redacted,
            classification.failures,
        );

        if report.is_complete() {
            tracing::info!(
                document_id = %report.id,
                preserved = report.preserved.len(),
                redacted = report.redacted_count(),
                discarded,
                "Document processed"
            );
        } else {
            tracing::warn!(
                document_id = %report.id,
                failed_passes = report.failed_passes.len(),
                redacted = report.redacted_count(),
                "Document processed with partial detection"
            );
        }

        report
    }

    /// Process many documents concurrently.
    ///
    /// At most `batch.concurrency` documents are in flight; reports come
    /// back in input order. Documents never share spans or failures.
    pub async fn process_batch<S>(&self, texts: &[S]) -> Vec<DocumentReport>
    where
        S: AsRef<str>,
    {
        tracing::debug!(
            documents = texts.len(),
            concurrency = self.batch.concurrency,
            "Processing batch"
        );

        stream::iter(texts.iter().map(|t| self.process_document(t.as_ref())))
            .buffered(self.batch.concurrency.max(1))
            .collect::<Vec<_>>()
            .await
    }
}

/// Single-detector pipeline: every PII entity is redacted with its raw
/// category tag (`[Person]`, `[Email]`, ...).
pub struct TaggedRedactor {
    pii: Arc<dyn PiiEntityDetector>,
    language: String,
    detector_timeout: Duration,
}

impl TaggedRedactor {
    pub fn new(pii: Arc<dyn PiiEntityDetector>, language: impl Into<String>) -> Self {
        Self {
            pii,
            language: language.into(),
            detector_timeout: ClassifierConfig::default().detector_timeout(),
        }
    }

    /// Take language and detector timeout from classifier settings
    pub fn from_config(pii: Arc<dyn PiiEntityDetector>, config: &ClassifierConfig) -> Self {
        Self::new(pii, config.language.clone()).with_timeout(config.detector_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.detector_timeout = timeout;
        self
    }

    /// Detect and redact; a detector failure or timeout is an error since
    /// no other source of spans exists.
    pub async fn process(&self, text: &str) -> Result<TaggedReport> {
        let call = self.pii.detect(text, &self.language);
        let outcome = match tokio::time::timeout(self.detector_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DetectorError::Timeout(self.detector_timeout)),
        };
        let entities = outcome.map_err(|e| {
            tracing::warn!(detector = self.pii.name(), error = %e, "PII detection failed");
            e
        })?;

        let redacted = engine::redact_tagged(text, &entities);
        let report = TaggedReport::new(text, entities, redacted);
        tracing::info!(entities = report.entity_count, "Tagged redaction completed");
        Ok(report)
    }
}
