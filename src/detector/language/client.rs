//! Language service HTTP client - entity recognition, PII, healthcare jobs

use super::wire::{
    AnalysisInput, AnalyzeJobRequest, AnalyzeTextRequest, AnalyzeTextResponse, JobState, JobTask,
    TaskParameters, TaskResults, DOCUMENT_ID, STRING_INDEX_TYPE,
};
use crate::config::ServiceConfig;
use crate::credentials::ServiceCredentials;
use crate::error::{DetectorError, RedactError, Result};
use crate::types::DetectedEntity;
use std::time::Duration;

const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION: &str = "operation-location";

/// Language used for healthcare analysis, which only supports English
const HEALTHCARE_LANGUAGE: &str = "en";

/// HTTP client for an Azure AI Language compatible endpoint
///
/// One client serves all three detection capabilities. Requests carry the
/// subscription key header and ask for code point offsets.
pub struct LanguageClient {
    http: reqwest::Client,
    credentials: ServiceCredentials,
    config: ServiceConfig,
    timeout: Duration,
}

impl LanguageClient {
    /// Build a client; `timeout` bounds each HTTP request
    pub fn new(
        credentials: ServiceCredentials,
        config: ServiceConfig,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RedactError::Config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(endpoint = %credentials.endpoint, "Language client ready");

        Ok(Self {
            http,
            credentials,
            config,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.credentials.endpoint
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/language/:analyze-text?api-version={}",
            self.credentials.endpoint, self.config.api_version
        )
    }

    fn jobs_url(&self) -> String {
        format!(
            "{}/language/analyze-text/jobs?api-version={}",
            self.credentials.endpoint, self.config.api_version
        )
    }

    fn parameters(&self) -> TaskParameters<'_> {
        TaskParameters {
            model_version: &self.config.model_version,
            string_index_type: STRING_INDEX_TYPE,
        }
    }

    /// Run a synchronous analysis task (`EntityRecognition`, `PiiEntityRecognition`)
    pub async fn analyze(
        &self,
        kind: &str,
        text: &str,
        language: &str,
    ) -> std::result::Result<Vec<DetectedEntity>, DetectorError> {
        let request = AnalyzeTextRequest {
            kind,
            parameters: self.parameters(),
            analysis_input: AnalysisInput::single(text, language),
        };

        let resp = self
            .http
            .post(self.analyze_url())
            .header(KEY_HEADER, &self.credentials.key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let resp = check_status(resp).await?;

        let body: AnalyzeTextResponse = resp
            .json()
            .await
            .map_err(|e| DetectorError::InvalidResponse(e.to_string()))?;

        let entities = document_entities(body.results)?;
        tracing::debug!(kind, entities = entities.len(), "Language analysis completed");
        Ok(entities)
    }

    /// Submit a healthcare analysis job and poll it to completion
    pub async fn analyze_healthcare(
        &self,
        text: &str,
    ) -> std::result::Result<Vec<DetectedEntity>, DetectorError> {
        let request = AnalyzeJobRequest {
            display_name: "a3s-redact",
            analysis_input: AnalysisInput::single(text, HEALTHCARE_LANGUAGE),
            tasks: vec![JobTask {
                kind: "Healthcare",
                task_name: "healthcare",
                parameters: self.parameters(),
            }],
        };

        let resp = self
            .http
            .post(self.jobs_url())
            .header(KEY_HEADER, &self.credentials.key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let resp = check_status(resp).await?;

        let location = resp
            .headers()
            .get(OPERATION_LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                DetectorError::InvalidResponse("job submission without operation-location".into())
            })?;

        tracing::debug!(operation = %location, "Healthcare job submitted");
        self.poll_job(&location).await
    }

    /// Poll until the job leaves the queued/running states.
    ///
    /// The loop has no deadline of its own; callers bound it with the
    /// detector timeout.
    async fn poll_job(
        &self,
        location: &str,
    ) -> std::result::Result<Vec<DetectedEntity>, DetectorError> {
        loop {
            let resp = self
                .http
                .get(location)
                .header(KEY_HEADER, &self.credentials.key)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;
            let resp = check_status(resp).await?;

            let state: JobState = resp
                .json()
                .await
                .map_err(|e| DetectorError::InvalidResponse(e.to_string()))?;

            match state.status.as_str() {
                "succeeded" => {
                    let results = state
                        .tasks
                        .items
                        .into_iter()
                        .find_map(|item| item.results)
                        .ok_or_else(|| {
                            DetectorError::InvalidResponse("job succeeded without results".into())
                        })?;
                    return document_entities(results);
                }
                "failed" | "cancelled" | "cancelling" | "partiallyCompleted" => {
                    let detail = state.errors.into_iter().next();
                    return Err(DetectorError::Service {
                        code: detail
                            .as_ref()
                            .map(|d| d.code.clone())
                            .unwrap_or_else(|| state.status.clone()),
                        message: detail
                            .map(|d| d.message)
                            .unwrap_or_else(|| format!("healthcare job {}", state.status)),
                    });
                }
                other => {
                    tracing::trace!(status = other, "Healthcare job pending");
                    tokio::time::sleep(self.config.poll_interval()).await;
                }
            }
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> DetectorError {
        if e.is_timeout() {
            DetectorError::Timeout(self.timeout)
        } else {
            DetectorError::Transport(e.to_string())
        }
    }
}

/// Map non-success statuses to detector errors
async fn check_status(
    resp: reqwest::Response,
) -> std::result::Result<reqwest::Response, DetectorError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(DetectorError::Auth(format!("HTTP {}: {}", status.as_u16(), body)));
    }
    Err(DetectorError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Extract our single document's entities, surfacing its error if any
fn document_entities(
    results: TaskResults,
) -> std::result::Result<Vec<DetectedEntity>, DetectorError> {
    if let Some(err) = results.errors.into_iter().find(|e| e.id == DOCUMENT_ID) {
        return Err(DetectorError::Service {
            code: err.error.code,
            message: err.error.message,
        });
    }

    results
        .documents
        .into_iter()
        .find(|d| d.id == DOCUMENT_ID)
        .map(|d| d.entities.into_iter().map(DetectedEntity::from).collect())
        .ok_or_else(|| DetectorError::InvalidResponse("document missing from results".into()))
}
