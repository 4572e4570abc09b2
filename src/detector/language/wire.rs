//! Request and response bodies of the language service REST API

use crate::types::DetectedEntity;
use serde::{Deserialize, Serialize};

/// Offsets are requested in code points so they line up with `char` indices
pub(super) const STRING_INDEX_TYPE: &str = "UnicodeCodePoint";

/// Only one document is ever sent per request
pub(super) const DOCUMENT_ID: &str = "1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TaskParameters<'a> {
    pub model_version: &'a str,
    pub string_index_type: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct InputDocument<'a> {
    pub id: &'a str,
    pub language: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalysisInput<'a> {
    pub documents: Vec<InputDocument<'a>>,
}

impl<'a> AnalysisInput<'a> {
    pub fn single(text: &'a str, language: &'a str) -> Self {
        Self {
            documents: vec![InputDocument {
                id: DOCUMENT_ID,
                language,
                text,
            }],
        }
    }
}

/// Body of a synchronous `:analyze-text` call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeTextRequest<'a> {
    pub kind: &'a str,
    pub parameters: TaskParameters<'a>,
    pub analysis_input: AnalysisInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JobTask<'a> {
    pub kind: &'a str,
    pub task_name: &'a str,
    pub parameters: TaskParameters<'a>,
}

/// Body of an `analyze-text/jobs` submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeJobRequest<'a> {
    pub display_name: &'a str,
    pub analysis_input: AnalysisInput<'a>,
    pub tasks: Vec<JobTask<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireEntity {
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub offset: usize,
    pub length: usize,
    pub confidence_score: f64,
}

impl From<WireEntity> for DetectedEntity {
    fn from(e: WireEntity) -> Self {
        Self {
            text: e.text,
            category: e.category,
            subcategory: e.subcategory,
            confidence: e.confidence_score.clamp(0.0, 1.0),
            offset: e.offset,
            length: e.length,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DocumentEntities {
    pub id: String,
    #[serde(default)]
    pub entities: Vec<WireEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DocumentError {
    pub id: String,
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(super) struct TaskResults {
    #[serde(default)]
    pub documents: Vec<DocumentEntities>,
    #[serde(default)]
    pub errors: Vec<DocumentError>,
}

/// Response of a synchronous `:analyze-text` call
#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeTextResponse {
    pub results: TaskResults,
}

#[derive(Debug, Deserialize)]
pub(super) struct JobTaskItem {
    #[serde(default)]
    pub results: Option<TaskResults>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct JobTasks {
    #[serde(default)]
    pub items: Vec<JobTaskItem>,
}

/// Job status document returned by polling `operation-location`
#[derive(Debug, Deserialize)]
pub(super) struct JobState {
    pub status: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
    #[serde(default)]
    pub tasks: JobTasks,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = AnalyzeTextRequest {
            kind: "EntityRecognition",
            parameters: TaskParameters {
                model_version: "latest",
                string_index_type: STRING_INDEX_TYPE,
            },
            analysis_input: AnalysisInput::single("Patient John", "en"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["kind"], "EntityRecognition");
        assert_eq!(json["parameters"]["stringIndexType"], "UnicodeCodePoint");
        assert_eq!(json["analysisInput"]["documents"][0]["id"], "1");
        assert_eq!(json["analysisInput"]["documents"][0]["text"], "Patient John");
    }

    #[test]
    fn test_parse_sync_response() {
        let body = r#"{
            "kind": "PiiEntityRecognitionResults",
            "results": {
                "documents": [{
                    "id": "1",
                    "redactedText": "***",
                    "entities": [{
                        "text": "123-45-6789",
                        "category": "USSocialSecurityNumber",
                        "offset": 26,
                        "length": 11,
                        "confidenceScore": 0.85
                    }],
                    "warnings": []
                }],
                "errors": [],
                "modelVersion": "2023-09-01"
            }
        }"#;
        let response: AnalyzeTextResponse = serde_json::from_str(body).unwrap();
        let entity: DetectedEntity = response
            .results
            .documents
            .into_iter()
            .next()
            .unwrap()
            .entities
            .into_iter()
            .next()
            .unwrap()
            .into();
        assert_eq!(entity.category, "USSocialSecurityNumber");
        assert_eq!(entity.offset, 26);
        assert_eq!(entity.confidence, 0.85);
    }

    #[test]
    fn test_parse_job_state() {
        let body = r#"{
            "jobId": "abc",
            "status": "succeeded",
            "errors": [],
            "tasks": {
                "completed": 1, "failed": 0, "inProgress": 0, "total": 1,
                "items": [{
                    "kind": "HealthcareLROResults",
                    "status": "succeeded",
                    "results": {
                        "documents": [{
                            "id": "1",
                            "entities": [{
                                "text": "Metformin",
                                "category": "MedicationName",
                                "offset": 13,
                                "length": 9,
                                "confidenceScore": 1.0
                            }],
                            "relations": []
                        }],
                        "errors": []
                    }
                }]
            }
        }"#;
        let state: JobState = serde_json::from_str(body).unwrap();
        assert_eq!(state.status, "succeeded");
        let results = state.tasks.items[0].results.as_ref().unwrap();
        assert_eq!(results.documents[0].entities[0].category, "MedicationName");
    }

    #[test]
    fn test_running_job_without_tasks() {
        let state: JobState = serde_json::from_str(r#"{"status": "running"}"#).unwrap();
        assert_eq!(state.status, "running");
        assert!(state.tasks.items.is_empty());
    }
}
