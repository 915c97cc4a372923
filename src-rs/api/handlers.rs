use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Error;
use crate::gateway::{
    ClientIntakeSubmission, DocumentAnalysisSubmission, LegalQuerySubmission, Submission,
};
use crate::task::{Task, TaskFailure, TaskKind, TaskOutput, TaskStatus};

use super::server::AppState;

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task_id: String,
    pub status: TaskStatus,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskFailure>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Task> for TaskStatusResponse {
    fn from(task: Task) -> Self {
        Self {
            task_id: task.id,
            status: task.status,
            result: task.result,
            error: task.error,
            created_at: task.created_at,
            completed_at: task.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskSummary {
    pub task_id: String,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            kind: task.kind(),
            status: task.status,
            created_at: task.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct TasksQuery {
    pub limit: Option<usize>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Error::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            Error::InvalidIdentifier(_) => (StatusCode::BAD_REQUEST, "invalid_identifier"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
        };
        let mut body = json!({"error": code, "detail": self.to_string()});
        if let Error::Validation { field, .. } = &self {
            body["field"] = json!(field);
        }
        (status, Json(body)).into_response()
    }
}

pub async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn handle_legal_query(
    State(state): State<AppState>,
    Json(req): Json<LegalQuerySubmission>,
) -> Result<Json<TaskResponse>, Error> {
    let task = state.gateway.submit(Submission::LegalQuery(req))?;
    Ok(Json(accepted(task, "legal query submitted for processing")))
}

pub async fn handle_analyze_document(
    State(state): State<AppState>,
    Json(req): Json<DocumentAnalysisSubmission>,
) -> Result<Json<TaskResponse>, Error> {
    let task = state.gateway.submit(Submission::DocumentAnalysis(req))?;
    Ok(Json(accepted(task, "document submitted for analysis")))
}

pub async fn handle_client_intake(
    State(state): State<AppState>,
    Json(req): Json<ClientIntakeSubmission>,
) -> Result<Json<TaskResponse>, Error> {
    let task = state.gateway.submit(Submission::ClientIntake(req))?;
    Ok(Json(accepted(task, "client intake submitted for processing")))
}

pub async fn handle_task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskStatusResponse>, Error> {
    let task = state.status.status(&id)?;
    Ok(Json(task.into()))
}

pub async fn handle_tasks(
    State(state): State<AppState>,
    Query(query): Query<TasksQuery>,
) -> Json<serde_json::Value> {
    let limit = query.limit.unwrap_or(10);
    let total = state.store.count();
    let tasks: Vec<TaskSummary> = state.store.list(limit).iter().map(TaskSummary::from).collect();
    Json(json!({"tasks": tasks, "total": total}))
}

fn accepted(task: Task, message: &str) -> TaskResponse {
    TaskResponse {
        task_id: task.id,
        status: task.status,
        message: message.to_string(),
    }
}
