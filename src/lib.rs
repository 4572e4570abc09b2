//! # a3s-redact
//!
//! De-identification of medical text for the A3S ecosystem.
//!
//! ## Overview
//!
//! `a3s-redact` removes identifying information from clinical notes while
//! keeping the clinically useful content. It does no NLP of its own: entity
//! spans come from an external recognition service, and this crate decides
//! which spans to remove, reconciles overlaps between detectors, and
//! rewrites the text with stable placeholders.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use a3s_redact::{ClassifierConfig, DetectedEntity, EntityClassifier, Redactor};
//! use a3s_redact::detector::memory::StaticDetector;
//!
//! # async fn example() {
//! let detector = Arc::new(StaticDetector::returning(vec![
//!     DetectedEntity::new("John Smith", "Person", 0.99, 9, 10),
//! ]));
//! let redactor = Redactor::new(EntityClassifier::with_detector(
//!     detector,
//!     ClassifierConfig::default(),
//! ));
//!
//! let report = redactor.process_document("Patient: John Smith, stable.").await;
//! assert_eq!(report.redacted_text, "Patient: [PERSON], stable.");
//! # }
//! ```
//!
//! ## Detectors
//!
//! - **memory**: scripted in-process detector for tests and offline use
//! - **language**: Azure AI Language compatible HTTP client
//!
//! ## Architecture
//!
//! - **EntityClassifier**: runs the healthcare, general and PII passes and
//!   sorts spans into preserved / medical / contact-PII groups
//! - **engine**: overlap resolution and placeholder rewriting
//! - **Redactor**: document and batch pipeline producing `DocumentReport`s

pub mod classifier;
pub mod config;
pub mod credentials;
pub mod detector;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod types;

// Re-export core types
pub use classifier::{Classification, EntityClassifier, PassFailure, PassResult};
pub use config::{BatchConfig, ClassifierConfig, RedactorConfig, ServiceConfig};
pub use credentials::{
    CredentialProvider, EnvCredentialProvider, ServiceCredentials, StaticCredentialProvider,
};
pub use detector::{GeneralEntityDetector, HealthcareEntityDetector, PiiEntityDetector};
pub use engine::{redact, redact_tagged, resolve_overlaps};
pub use error::{DetectorError, RedactError, Result};
pub use pipeline::{Redactor, TaggedRedactor};
pub use report::{DocumentReport, TaggedReport};
pub use types::{CategoryGroup, DetectedEntity, DetectionPass, EntityCategory, Span};

// Re-export detectors for convenience
pub use detector::language::{LanguageClient, LanguageDetector};
pub use detector::memory::StaticDetector;
