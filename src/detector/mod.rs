//! Entity detector traits - the seam to the external recognition service
//!
//! The pipeline never performs its own NLP. Each detector wraps one
//! recognition capability and returns raw labeled spans; the
//! `EntityClassifier` decides what to keep.
//!
//! Three capabilities are consumed:
//!
//! - **healthcare**: clinical terms (medications, dosages, diagnoses, ...)
//! - **general**: named entities (persons, dates, ...)
//! - **pii**: contact PII (email, phone, SSN, IP, URL)
//!
//! ## Implementations
//!
//! - **memory**: scripted in-process detector for tests and offline use
//! - **language**: HTTP client for an Azure AI Language compatible service

use crate::error::DetectorError;
use crate::types::DetectedEntity;
use async_trait::async_trait;

pub mod language;
pub mod memory;

/// Outcome of a single detector call
pub type DetectionResult = std::result::Result<Vec<DetectedEntity>, DetectorError>;

/// Healthcare entity recognition
#[async_trait]
pub trait HealthcareEntityDetector: Send + Sync {
    /// Detect clinical entities in `text`
    async fn detect(&self, text: &str) -> DetectionResult;

    /// Detector name used in logs
    fn name(&self) -> &str;
}

/// General named-entity recognition
#[async_trait]
pub trait GeneralEntityDetector: Send + Sync {
    /// Detect named entities in `text` written in `language`
    async fn detect(&self, text: &str, language: &str) -> DetectionResult;

    /// Detector name used in logs
    fn name(&self) -> &str;
}

/// PII-specific entity recognition
#[async_trait]
pub trait PiiEntityDetector: Send + Sync {
    /// Detect PII entities in `text` written in `language`
    async fn detect(&self, text: &str, language: &str) -> DetectionResult;

    /// Detector name used in logs
    fn name(&self) -> &str;
}
