use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Map};

use crate::task::{Task, TaskFailure, TaskOutput, TaskPayload};

/// The asynchronous backend that actually produces results. The rest of the
/// service only ever sees it through this trait; outcomes flow back into the
/// store as transitions, never as return values to the submitter.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn run(&self, task: &Task) -> Result<TaskOutput, TaskFailure>;
}

/// Default executor: turns the normalized payload into a working brief and
/// returns it with routing metadata. It keeps the service runnable end to
/// end; a real reasoning backend plugs in behind the same trait.
pub struct BriefingExecutor;

#[async_trait]
impl Executor for BriefingExecutor {
    async fn run(&self, task: &Task) -> Result<TaskOutput, TaskFailure> {
        let started = Instant::now();
        let brief = task.payload.brief();

        let mut metadata = Map::new();
        metadata.insert("agent".to_string(), json!("briefing"));
        metadata.insert("task_type".to_string(), json!(task.kind().to_string()));
        match &task.payload {
            TaskPayload::LegalQuery { query, .. } => {
                metadata.insert("query".to_string(), json!(query));
                metadata.insert(
                    "client_type".to_string(),
                    json!(task.payload.client_type().to_string()),
                );
            }
            TaskPayload::DocumentAnalysis { analysis_type, .. } => {
                metadata.insert("analysis_focus".to_string(), json!(analysis_type.focus()));
                metadata.insert(
                    "client_type".to_string(),
                    json!(task.payload.client_type().to_string()),
                );
            }
            TaskPayload::ClientIntake {
                client_name,
                case_type,
                ..
            } => {
                metadata.insert("client_name".to_string(), json!(client_name));
                metadata.insert("case_type".to_string(), json!(case_type));
            }
        }
        metadata.insert(
            "elapsed_ms".to_string(),
            json!(started.elapsed().as_millis() as u64),
        );

        Ok(TaskOutput {
            output: brief,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskStatus, TaskStore};

    fn task_for(payload: TaskPayload) -> Task {
        let store = TaskStore::new();
        let task = store.create(payload);
        assert_eq!(task.status, TaskStatus::Pending);
        task
    }

    #[tokio::test]
    async fn brief_output_is_never_empty() {
        let task = task_for(TaskPayload::LegalQuery {
            query: "Is a verbal contract enforceable?".to_string(),
            case_type: "general".to_string(),
            jurisdiction: "federal".to_string(),
            urgency: "normal".to_string(),
            additional_context: None,
        });
        let output = BriefingExecutor.run(&task).await.expect("run succeeds");
        assert!(!output.output.is_empty());
        assert_eq!(output.metadata["task_type"], "legal_query");
        assert_eq!(output.metadata["client_type"], "citizen");
        assert_eq!(output.metadata["agent"], "briefing");
    }

    #[tokio::test]
    async fn intake_metadata_names_the_client() {
        let task = task_for(TaskPayload::ClientIntake {
            client_name: "Ada Lovelace".to_string(),
            case_description: "Vendor dispute".to_string(),
            case_type: "corporate".to_string(),
            jurisdiction: "federal".to_string(),
            preferred_outcome: None,
            budget_range: None,
            timeline: None,
        });
        let output = BriefingExecutor.run(&task).await.expect("run succeeds");
        assert_eq!(output.metadata["client_name"], "Ada Lovelace");
        assert_eq!(output.metadata["case_type"], "corporate");
        assert_eq!(output.metadata["task_type"], "client_intake");
    }
}
