//! Entity classifier
//!
//! Runs up to three independent detection passes over a document and sorts
//! the returned spans into three disjoint groups:
//!
//! ```text
//! text → [healthcare] → preserved    (clinical terms, never rewritten)
//!      → [general]    → medical      (persons, calendar dates)
//!      → [pii]        → contact_pii  (email, phone, SSN, IP, URL)
//! ```
//!
//! A failing or timed-out detector never aborts the document: its pass
//! contributes zero spans and the failure is recorded in the result.

use crate::config::ClassifierConfig;
use crate::detector::{
    DetectionResult, GeneralEntityDetector, HealthcareEntityDetector, PiiEntityDetector,
};
use crate::error::DetectorError;
use crate::types::{CategoryGroup, DetectedEntity, DetectionPass, EntityCategory, Span};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// A detection pass that failed for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassFailure {
    pub pass: DetectionPass,
    pub reason: String,
}

/// Outcome of one detection pass
#[derive(Debug, Clone)]
pub struct PassResult {
    pub pass: DetectionPass,
    /// Accepted spans, in detector order
    pub spans: Vec<Span>,
    /// Set when the detector call failed; `spans` is then empty
    pub error: Option<DetectorError>,
}

impl PassResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The failure record for reports, if the pass failed
    pub fn failure(&self) -> Option<PassFailure> {
        self.error.as_ref().map(|e| PassFailure {
            pass: self.pass,
            reason: e.to_string(),
        })
    }
}

/// Spans of one document sorted into the three groups
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub preserved: Vec<Span>,
    pub medical: Vec<Span>,
    pub contact_pii: Vec<Span>,
    pub failures: Vec<PassFailure>,
}

/// Classifier over three injected detectors
pub struct EntityClassifier {
    healthcare: Arc<dyn HealthcareEntityDetector>,
    general: Arc<dyn GeneralEntityDetector>,
    pii: Arc<dyn PiiEntityDetector>,
    config: ClassifierConfig,
    duration_words: Vec<String>,
}

impl EntityClassifier {
    pub fn new(
        healthcare: Arc<dyn HealthcareEntityDetector>,
        general: Arc<dyn GeneralEntityDetector>,
        pii: Arc<dyn PiiEntityDetector>,
        config: ClassifierConfig,
    ) -> Self {
        let duration_words = config
            .duration_words
            .iter()
            .map(|w| w.to_lowercase())
            .collect();
        Self {
            healthcare,
            general,
            pii,
            config,
            duration_words,
        }
    }

    /// Use one detector for all three passes
    pub fn with_detector<D>(detector: Arc<D>, config: ClassifierConfig) -> Self
    where
        D: HealthcareEntityDetector + GeneralEntityDetector + PiiEntityDetector + 'static,
    {
        Self::new(detector.clone(), detector.clone(), detector, config)
    }

    /// Clinical terms to preserve
    pub async fn detect_preserved(&self, text: &str) -> PassResult {
        let call = self.healthcare.detect(text);
        self.run_pass(DetectionPass::Healthcare, self.healthcare.name(), text, call, |_, c| {
            c.group() == CategoryGroup::Preserved
        })
        .await
    }

    /// Person names and calendar dates to redact
    pub async fn detect_medical(&self, text: &str) -> PassResult {
        let call = self.general.detect(text, &self.config.language);
        self.run_pass(DetectionPass::General, self.general.name(), text, call, |e, c| {
            match c {
                EntityCategory::Person => true,
                EntityCategory::DateTime => self.is_calendar_date(e),
                _ => false,
            }
        })
        .await
    }

    /// Contact PII to redact
    pub async fn detect_contact_pii(&self, text: &str) -> PassResult {
        let call = self.pii.detect(text, &self.config.language);
        self.run_pass(DetectionPass::Pii, self.pii.name(), text, call, |_, c| {
            c.group() == CategoryGroup::ContactPii
        })
        .await
    }

    /// Run all three passes in sequence
    pub async fn classify(&self, text: &str) -> Classification {
        let passes = [
            self.detect_preserved(text).await,
            self.detect_medical(text).await,
            self.detect_contact_pii(text).await,
        ];

        let mut classification = Classification::default();
        for result in passes {
            if let Some(failure) = result.failure() {
                classification.failures.push(failure);
            }
            match result.pass {
                DetectionPass::Healthcare => classification.preserved = result.spans,
                DetectionPass::General => classification.medical = result.spans,
                DetectionPass::Pii => classification.contact_pii = result.spans,
            }
        }
        classification
    }

    /// DateTime spans are only redacted when they look like calendar
    /// dates: confident, containing a digit, and free of duration words.
    fn is_calendar_date(&self, entity: &DetectedEntity) -> bool {
        let confidence = entity.confidence;
        if confidence.is_nan() || confidence <= self.config.date_confidence_threshold {
            return false;
        }
        if !entity.text.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        let lowered = entity.text.to_lowercase();
        !self
            .duration_words
            .iter()
            .any(|word| lowered.contains(word.as_str()))
    }

    async fn run_pass<F, K>(
        &self,
        pass: DetectionPass,
        detector: &str,
        text: &str,
        call: F,
        keep: K,
    ) -> PassResult
    where
        F: Future<Output = DetectionResult>,
        K: Fn(&DetectedEntity, EntityCategory) -> bool,
    {
        let timeout = self.config.detector_timeout();
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DetectorError::Timeout(timeout)),
        };

        let entities = match outcome {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!(
                    pass = %pass,
                    detector,
                    error = %e,
                    "Detector call failed, pass contributes no spans"
                );
                return PassResult {
                    pass,
                    spans: Vec::new(),
                    error: Some(e),
                };
            }
        };

        let char_len = text.chars().count();
        let received = entities.len();
        let spans: Vec<Span> = entities
            .iter()
            .filter_map(|entity| {
                let Some(category) = EntityCategory::from_label(&entity.category) else {
                    tracing::trace!(pass = %pass, category = %entity.category, "Skipping unknown category");
                    return None;
                };
                if !entity.fits(char_len) {
                    tracing::warn!(
                        pass = %pass,
                        offset = entity.offset,
                        length = entity.length,
                        char_len,
                        "Dropping span outside document bounds"
                    );
                    return None;
                }
                keep(entity, category).then(|| Span::from_entity(entity, category))
            })
            .collect();

        tracing::debug!(pass = %pass, detector, received, kept = spans.len(), "Pass completed");

        PassResult {
            pass,
            spans,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::memory::StaticDetector;
    use std::time::Duration;

    fn classifier(
        healthcare: StaticDetector,
        general: StaticDetector,
        pii: StaticDetector,
    ) -> EntityClassifier {
        EntityClassifier::new(
            Arc::new(healthcare),
            Arc::new(general),
            Arc::new(pii),
            ClassifierConfig::default(),
        )
    }

    fn general_only(entities: Vec<DetectedEntity>) -> EntityClassifier {
        classifier(
            StaticDetector::empty(),
            StaticDetector::returning(entities),
            StaticDetector::empty(),
        )
    }

    #[tokio::test]
    async fn test_duration_is_not_a_date() {
        let text = "follow-up in 6 months";
        let c = general_only(vec![DetectedEntity::new("6 months", "DateTime", 0.97, 13, 8)]);
        let result = c.detect_medical(text).await;
        assert!(result.is_ok());
        assert!(result.spans.is_empty());
    }

    #[tokio::test]
    async fn test_calendar_date_is_kept() {
        let text = "Admitted on January 20, 2024";
        let c = general_only(vec![DetectedEntity::new(
            "January 20, 2024",
            "DateTime",
            0.99,
            12,
            16,
        )]);
        let result = c.detect_medical(text).await;
        assert_eq!(result.spans.len(), 1);
        assert_eq!(result.spans[0].category, EntityCategory::DateTime);
        assert_eq!(result.spans[0].offset, 12);
    }

    #[tokio::test]
    async fn test_date_filters() {
        let text = "seen yesterday, then on 2024-01-20, for 3 WEEKS, at 0.95";
        let c = general_only(vec![
            // no digit
            DetectedEntity::new("yesterday", "DateTime", 0.99, 5, 9),
            // accepted
            DetectedEntity::new("2024-01-20", "DateTime", 0.96, 24, 10),
            // duration word, case-insensitive
            DetectedEntity::new("3 WEEKS", "DateTime", 0.99, 40, 7),
        ]);
        let spans = c.detect_medical(text).await.spans;
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "2024-01-20");
    }

    #[tokio::test]
    async fn test_date_threshold_is_strict() {
        let text = "on 2024-01-20";
        let c = general_only(vec![DetectedEntity::new("2024-01-20", "DateTime", 0.95, 3, 10)]);
        assert!(c.detect_medical(text).await.spans.is_empty());
    }

    #[tokio::test]
    async fn test_nan_confidence_date_is_rejected() {
        let text = "on 2024-01-20";
        let c = general_only(vec![DetectedEntity::new(
            "2024-01-20",
            "DateTime",
            f64::NAN,
            3,
            10,
        )]);
        assert!(c.detect_medical(text).await.spans.is_empty());
    }

    #[tokio::test]
    async fn test_date_needs_decimal_digit() {
        let text = "in Ⅻ Ides or ½ past";
        let c = general_only(vec![
            DetectedEntity::new("Ⅻ Ides", "DateTime", 0.99, 3, 6),
            DetectedEntity::new("½ past", "DateTime", 0.99, 13, 6),
        ]);
        assert!(c.detect_medical(text).await.spans.is_empty());
    }

    #[tokio::test]
    async fn test_configured_language_reaches_detectors() {
        let general = Arc::new(StaticDetector::empty());
        let pii = Arc::new(StaticDetector::empty());
        let config = ClassifierConfig {
            language: "de".to_string(),
            ..ClassifierConfig::default()
        };
        let c = EntityClassifier::new(
            Arc::new(StaticDetector::empty()),
            general.clone(),
            pii.clone(),
            config,
        );
        c.classify("Herr Müller").await;
        assert_eq!(general.last_language().await.as_deref(), Some("de"));
        assert_eq!(pii.last_language().await.as_deref(), Some("de"));
    }

    #[tokio::test]
    async fn test_person_any_confidence_and_other_categories_dropped() {
        let text = "Dr Linda at Memorial Hospital";
        let c = general_only(vec![
            DetectedEntity::new("Linda", "Person", 0.31, 3, 5),
            DetectedEntity::new("Memorial Hospital", "Organization", 0.99, 12, 17),
            DetectedEntity::new("Dr", "PersonType", 0.9, 0, 2),
        ]);
        let spans = c.detect_medical(text).await.spans;
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].category, EntityCategory::Person);
    }

    #[tokio::test]
    async fn test_preserved_allowlist() {
        let text = "Metformin 500mg BID";
        let c = classifier(
            StaticDetector::returning(vec![
                DetectedEntity::new("Metformin", "MedicationName", 1.0, 0, 9),
                DetectedEntity::new("500mg", "Dosage", 1.0, 10, 5),
                DetectedEntity::new("BID", "Frequency", 1.0, 16, 3),
                DetectedEntity::new("500mg", "GeneOrProtein", 0.7, 10, 5),
                DetectedEntity::new("Metformin", "Person", 0.5, 0, 9),
            ]),
            StaticDetector::empty(),
            StaticDetector::empty(),
        );
        let spans = c.detect_preserved(text).await.spans;
        let categories: Vec<_> = spans.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![
                EntityCategory::MedicationName,
                EntityCategory::Dosage,
                EntityCategory::Frequency
            ]
        );
    }

    #[tokio::test]
    async fn test_contact_pii_allowlist() {
        let text = "Mail a@b.io or call 555-0123 at Acme";
        let c = classifier(
            StaticDetector::empty(),
            StaticDetector::empty(),
            StaticDetector::returning(vec![
                DetectedEntity::new("a@b.io", "Email", 0.8, 5, 6),
                DetectedEntity::new("555-0123", "PhoneNumber", 0.8, 20, 8),
                DetectedEntity::new("Acme", "Organization", 0.9, 32, 4),
                DetectedEntity::new("Mail", "Person", 0.9, 0, 4),
            ]),
        );
        let spans = c.detect_contact_pii(text).await.spans;
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].category, EntityCategory::PhoneNumber);
    }

    #[tokio::test]
    async fn test_out_of_bounds_span_dropped() {
        let c = general_only(vec![DetectedEntity::new("Smith", "Person", 0.9, 8, 5)]);
        assert!(c.detect_medical("John").await.spans.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_isolated_per_pass() {
        let text = "John";
        let c = classifier(
            StaticDetector::failing(DetectorError::Transport("connection reset".into())),
            StaticDetector::returning(vec![DetectedEntity::new("John", "Person", 0.9, 0, 4)]),
            StaticDetector::empty(),
        );
        let classification = c.classify(text).await;
        assert!(classification.preserved.is_empty());
        assert_eq!(classification.medical.len(), 1);
        assert_eq!(classification.failures.len(), 1);
        assert_eq!(classification.failures[0].pass, DetectionPass::Healthcare);
        assert!(classification.failures[0].reason.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let mut config = ClassifierConfig::default();
        config.detector_timeout_secs = 1;
        let c = EntityClassifier::new(
            Arc::new(StaticDetector::empty()),
            Arc::new(StaticDetector::empty().with_delay(Duration::from_secs(5))),
            Arc::new(StaticDetector::empty()),
            config,
        );
        tokio::time::pause();
        let result = c.detect_medical("text").await;
        assert!(matches!(result.error, Some(DetectorError::Timeout(_))));
        assert!(result.spans.is_empty());
    }

    #[tokio::test]
    async fn test_classification_is_deterministic() {
        let text = "John Smith seen on 2024-01-20, email j@x.io";
        let detector = Arc::new(StaticDetector::returning(vec![
            DetectedEntity::new("John Smith", "Person", 0.99, 0, 10),
            DetectedEntity::new("2024-01-20", "DateTime", 0.99, 19, 10),
            DetectedEntity::new("j@x.io", "Email", 0.9, 37, 6),
        ]));
        let c = EntityClassifier::with_detector(detector, ClassifierConfig::default());

        let first = c.classify(text).await;
        let second = c.classify(text).await;
        assert_eq!(first.medical, second.medical);
        assert_eq!(first.contact_pii, second.contact_pii);
        assert_eq!(first.preserved, second.preserved);
        assert_eq!(first.medical.len(), 2);
        assert_eq!(first.contact_pii.len(), 1);
    }
}
