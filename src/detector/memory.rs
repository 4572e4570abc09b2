//! In-memory scripted detector
//!
//! Returns fixed entities (or a fixed error) instead of calling a service.
//! Responses can be scripted per input text, which makes it possible to
//! fail for one document of a batch while succeeding for another.

use super::{
    DetectionResult, GeneralEntityDetector, HealthcareEntityDetector, PiiEntityDetector,
};
use crate::error::DetectorError;
use crate::types::DetectedEntity;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Scripted detector implementing all three detector traits
#[derive(Debug)]
pub struct StaticDetector {
    name: String,
    fallback: DetectionResult,
    scripted: HashMap<String, DetectionResult>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_language: RwLock<Option<String>>,
}

impl StaticDetector {
    /// Detector that returns `entities` for every input
    pub fn returning(entities: Vec<DetectedEntity>) -> Self {
        Self::from_result(Ok(entities))
    }

    /// Detector that finds nothing
    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    /// Detector that fails every call with `error`
    pub fn failing(error: DetectorError) -> Self {
        Self::from_result(Err(error))
    }

    fn from_result(fallback: DetectionResult) -> Self {
        Self {
            name: "static".to_string(),
            fallback,
            scripted: HashMap::new(),
            delay: None,
            calls: AtomicUsize::new(0),
            last_language: RwLock::new(None),
        }
    }

    /// Return `entities` when the input equals `text`
    pub fn on(mut self, text: impl Into<String>, entities: Vec<DetectedEntity>) -> Self {
        self.scripted.insert(text.into(), Ok(entities));
        self
    }

    /// Fail with `error` when the input equals `text`
    pub fn fail_on(mut self, text: impl Into<String>, error: DetectorError) -> Self {
        self.scripted.insert(text.into(), Err(error));
        self
    }

    /// Sleep before answering (used to exercise timeouts)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of calls answered so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Language passed on the most recent call (`None` for healthcare calls)
    pub async fn last_language(&self) -> Option<String> {
        self.last_language.read().await.clone()
    }

    async fn respond(&self, text: &str, language: Option<&str>) -> DetectionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_language.write().await = language.map(str::to_string);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.scripted
            .get(text)
            .unwrap_or(&self.fallback)
            .clone()
    }
}

#[async_trait]
impl HealthcareEntityDetector for StaticDetector {
    async fn detect(&self, text: &str) -> DetectionResult {
        self.respond(text, None).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl GeneralEntityDetector for StaticDetector {
    async fn detect(&self, text: &str, language: &str) -> DetectionResult {
        self.respond(text, Some(language)).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl PiiEntityDetector for StaticDetector {
    async fn detect(&self, text: &str, language: &str) -> DetectionResult {
        self.respond(text, Some(language)).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
