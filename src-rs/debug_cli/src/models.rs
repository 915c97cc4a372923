use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub wait: bool,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Default, Serialize)]
pub struct LegalQueryRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct DocumentAnalysisRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct ClientIntakeRequest {
    pub client_name: String,
    pub case_description: String,
    pub case_type: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub task_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub task_id: String,
    pub status: String,
    pub result: Option<Value>,
    pub error: Option<Value>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl StatusResponse {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed")
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskSummary {
    pub task_id: String,
    pub kind: String,
    pub status: String,
    pub created_at: String,
}
