//! Language service detector
//!
//! Implements all three detector traits over one `LanguageClient`, so a
//! single `Arc<LanguageDetector>` can be handed to the classifier for every
//! pass.

mod client;
mod wire;

pub use client::LanguageClient;

use super::{DetectionResult, GeneralEntityDetector, HealthcareEntityDetector, PiiEntityDetector};
use crate::config::{ClassifierConfig, ServiceConfig};
use crate::credentials::{CredentialProvider, ServiceCredentials};
use crate::error::Result;
use async_trait::async_trait;

/// Language service detector
pub struct LanguageDetector {
    client: LanguageClient,
}

impl LanguageDetector {
    /// Resolve credentials and build the HTTP client
    pub fn connect(
        provider: &dyn CredentialProvider,
        service: &ServiceConfig,
        classifier: &ClassifierConfig,
    ) -> Result<Self> {
        let credentials = ServiceCredentials::load(provider, service)?;
        let client = LanguageClient::new(
            credentials,
            service.clone(),
            classifier.detector_timeout(),
        )?;
        Ok(Self { client })
    }

    /// Get the underlying client for advanced usage
    pub fn client(&self) -> &LanguageClient {
        &self.client
    }
}

#[async_trait]
impl HealthcareEntityDetector for LanguageDetector {
    async fn detect(&self, text: &str) -> DetectionResult {
        self.client.analyze_healthcare(text).await
    }

    fn name(&self) -> &str {
        "language-healthcare"
    }
}

#[async_trait]
impl GeneralEntityDetector for LanguageDetector {
    async fn detect(&self, text: &str, language: &str) -> DetectionResult {
        self.client.analyze("EntityRecognition", text, language).await
    }

    fn name(&self) -> &str {
        "language-ner"
    }
}

#[async_trait]
impl PiiEntityDetector for LanguageDetector {
    async fn detect(&self, text: &str, language: &str) -> DetectionResult {
        self.client
            .analyze("PiiEntityRecognition", text, language)
            .await
    }

    fn name(&self) -> &str {
        "language-pii"
    }
}
