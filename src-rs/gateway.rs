use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;
use crate::executor::Executor;
use crate::task::{AnalysisType, Task, TaskFailure, TaskPayload, TaskStore, Transition};

const DEFAULT_CASE_TYPE: &str = "general";
const DEFAULT_JURISDICTION: &str = "federal";
const DEFAULT_URGENCY: &str = "normal";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LegalQuerySubmission {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub additional_context: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DocumentAnalysisSubmission {
    #[serde(default)]
    pub document_text: Option<String>,
    #[serde(default)]
    pub file_reference: Option<String>,
    #[serde(default)]
    pub analysis_type: Option<String>,
    #[serde(default)]
    pub specific_sections: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClientIntakeSubmission {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub case_description: Option<String>,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub preferred_outcome: Option<String>,
    #[serde(default)]
    pub budget_range: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
}

/// A raw, unvalidated request of a known kind.
#[derive(Clone, Debug)]
pub enum Submission {
    LegalQuery(LegalQuerySubmission),
    DocumentAnalysis(DocumentAnalysisSubmission),
    ClientIntake(ClientIntakeSubmission),
}

impl Submission {
    /// Validates the kind-specific required fields and produces the canonical
    /// payload, applying the documented defaults. Nothing is created when
    /// this fails.
    pub fn normalize(self) -> Result<TaskPayload, Error> {
        match self {
            Self::LegalQuery(req) => Ok(TaskPayload::LegalQuery {
                query: required("query", req.query)?,
                case_type: or_default(req.case_type, DEFAULT_CASE_TYPE),
                jurisdiction: or_default(req.jurisdiction, DEFAULT_JURISDICTION),
                urgency: or_default(req.urgency, DEFAULT_URGENCY),
                additional_context: optional(req.additional_context),
            }),
            Self::DocumentAnalysis(req) => {
                let (document_text, file_reference) =
                    match (optional(req.document_text), optional(req.file_reference)) {
                        (Some(text), None) => (Some(text), None),
                        (None, Some(reference)) => (None, Some(reference)),
                        (None, None) => {
                            return Err(Error::Validation {
                                field: "document_text",
                                message: "or file_reference is required",
                            })
                        }
                        (Some(_), Some(_)) => {
                            return Err(Error::Validation {
                                field: "document_text",
                                message: "and file_reference are mutually exclusive",
                            })
                        }
                    };
                // Unknown analysis types fall back to a comprehensive pass.
                let analysis_type = req
                    .analysis_type
                    .as_deref()
                    .and_then(AnalysisType::from_name)
                    .unwrap_or_default();
                Ok(TaskPayload::DocumentAnalysis {
                    document_text,
                    file_reference,
                    analysis_type,
                    specific_sections: req.specific_sections.filter(|s| !s.is_empty()),
                })
            }
            Self::ClientIntake(req) => Ok(TaskPayload::ClientIntake {
                client_name: required("client_name", req.client_name)?,
                case_description: required("case_description", req.case_description)?,
                case_type: required("case_type", req.case_type)?,
                jurisdiction: or_default(req.jurisdiction, DEFAULT_JURISDICTION),
                preferred_outcome: optional(req.preferred_outcome),
                budget_range: optional(req.budget_range),
                timeline: optional(req.timeline),
            }),
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, Error> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(Error::Validation {
            field,
            message: "is required and must not be empty",
        }),
    }
}

fn or_default(value: Option<String>, fallback: &str) -> String {
    optional(value).unwrap_or_else(|| fallback.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts submissions, creates the pending record, and hands execution off
/// without making the caller wait on it.
pub struct SubmissionGateway {
    store: Arc<TaskStore>,
    executor: Arc<dyn Executor>,
    execution_timeout: Duration,
}

impl SubmissionGateway {
    pub fn new(
        store: Arc<TaskStore>,
        executor: Arc<dyn Executor>,
        execution_timeout: Duration,
    ) -> Self {
        Self {
            store,
            executor,
            execution_timeout,
        }
    }

    /// Returns the new pending record as soon as it is stored; execution runs
    /// on its own task. Exactly one record and one dispatch per call.
    pub fn submit(&self, submission: Submission) -> Result<Task, Error> {
        let payload = submission.normalize()?;
        let task = self.store.create(payload);
        tracing::info!(id = %task.id, kind = %task.kind(), "task accepted");
        self.dispatch(task.clone());
        Ok(task)
    }

    fn dispatch(&self, task: Task) {
        let store = Arc::clone(&self.store);
        let executor = Arc::clone(&self.executor);
        let timeout = self.execution_timeout;
        tokio::spawn(async move {
            if let Err(err) = store.transition(&task.id, Transition::Processing) {
                tracing::error!(id = %task.id, %err, "could not mark task processing");
                return;
            }
            let change = match tokio::time::timeout(timeout, executor.run(&task)).await {
                Ok(Ok(output)) => Transition::Completed(output),
                Ok(Err(failure)) => Transition::Failed(failure),
                Err(_) => Transition::Failed(TaskFailure::timeout(timeout)),
            };
            if let Err(err) = store.transition(&task.id, change) {
                tracing::error!(id = %task.id, %err, "could not record task outcome");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{FailureKind, TaskOutput, TaskStatus};
    use async_trait::async_trait;

    struct InstantExecutor;

    #[async_trait]
    impl Executor for InstantExecutor {
        async fn run(&self, task: &Task) -> Result<TaskOutput, TaskFailure> {
            Ok(TaskOutput {
                output: task.payload.brief(),
                metadata: serde_json::Map::new(),
            })
        }
    }

    struct FailingExecutor;

    #[async_trait]
    impl Executor for FailingExecutor {
        async fn run(&self, _task: &Task) -> Result<TaskOutput, TaskFailure> {
            Err(TaskFailure::execution("backend unavailable"))
        }
    }

    struct SleepyExecutor(Duration);

    #[async_trait]
    impl Executor for SleepyExecutor {
        async fn run(&self, _task: &Task) -> Result<TaskOutput, TaskFailure> {
            tokio::time::sleep(self.0).await;
            Ok(TaskOutput {
                output: "too late".to_string(),
                metadata: serde_json::Map::new(),
            })
        }
    }

    fn gateway_with(
        executor: Arc<dyn Executor>,
        timeout: Duration,
    ) -> (Arc<TaskStore>, SubmissionGateway) {
        let store = Arc::new(TaskStore::new());
        let gateway = SubmissionGateway::new(Arc::clone(&store), executor, timeout);
        (store, gateway)
    }

    fn query(text: &str) -> Submission {
        Submission::LegalQuery(LegalQuerySubmission {
            query: Some(text.to_string()),
            ..Default::default()
        })
    }

    async fn poll_until_terminal(store: &TaskStore, id: &str) -> Task {
        for _ in 0..500 {
            let task = store.get(id).expect("record should exist");
            if task.status.is_terminal() {
                return task;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task {} never reached a terminal state", id);
    }

    #[test]
    fn empty_query_is_rejected_by_field_name() {
        let err = query("   ").normalize().expect_err("blank query");
        assert_eq!(
            err,
            Error::Validation {
                field: "query",
                message: "is required and must not be empty",
            }
        );
    }

    #[test]
    fn intake_missing_client_name_is_rejected() {
        let submission = Submission::ClientIntake(ClientIntakeSubmission {
            case_description: Some("Dispute over unpaid invoices.".to_string()),
            case_type: Some("corporate".to_string()),
            ..Default::default()
        });
        let err = submission.normalize().expect_err("missing client_name");
        assert!(matches!(
            err,
            Error::Validation {
                field: "client_name",
                ..
            }
        ));
    }

    #[test]
    fn document_submission_needs_exactly_one_source() {
        let neither = Submission::DocumentAnalysis(DocumentAnalysisSubmission::default());
        assert!(matches!(
            neither.normalize().expect_err("no source"),
            Error::Validation {
                field: "document_text",
                ..
            }
        ));

        let both = Submission::DocumentAnalysis(DocumentAnalysisSubmission {
            document_text: Some("text".to_string()),
            file_reference: Some("upload-1".to_string()),
            ..Default::default()
        });
        assert!(matches!(
            both.normalize().expect_err("two sources"),
            Error::Validation {
                field: "document_text",
                ..
            }
        ));
    }

    #[test]
    fn legal_query_defaults_are_applied() {
        let payload = query("Can I sublet?").normalize().expect("valid");
        match payload {
            TaskPayload::LegalQuery {
                case_type,
                jurisdiction,
                urgency,
                ..
            } => {
                assert_eq!(case_type, "general");
                assert_eq!(jurisdiction, "federal");
                assert_eq!(urgency, "normal");
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn unknown_analysis_type_falls_back_to_comprehensive() {
        let submission = Submission::DocumentAnalysis(DocumentAnalysisSubmission {
            document_text: Some("clause".to_string()),
            analysis_type: Some("deep_magic".to_string()),
            ..Default::default()
        });
        match submission.normalize().expect("valid") {
            TaskPayload::DocumentAnalysis { analysis_type, .. } => {
                assert_eq!(analysis_type, AnalysisType::Comprehensive);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn submit_returns_before_execution_finishes() {
        let (store, gateway) = gateway_with(
            Arc::new(SleepyExecutor(Duration::from_secs(5))),
            Duration::from_secs(30),
        );
        let task = gateway.submit(query("slow one")).expect("accepted");
        assert_eq!(task.status, TaskStatus::Pending);

        let visible = store.get(&task.id).expect("record should exist");
        assert!(!visible.status.is_terminal());
    }

    #[tokio::test]
    async fn successful_execution_completes_the_record() {
        let (store, gateway) =
            gateway_with(Arc::new(InstantExecutor), Duration::from_secs(30));
        let task = gateway.submit(query("quick one")).expect("accepted");
        let done = poll_until_terminal(&store, &task.id).await;
        assert_eq!(done.status, TaskStatus::Completed);
        assert!(!done.result.expect("result present").output.is_empty());
        assert!(done.error.is_none());
    }

    #[tokio::test]
    async fn executor_failure_becomes_a_failed_record() {
        let (store, gateway) =
            gateway_with(Arc::new(FailingExecutor), Duration::from_secs(30));
        let task = gateway.submit(query("doomed")).expect("accepted");
        let done = poll_until_terminal(&store, &task.id).await;
        assert_eq!(done.status, TaskStatus::Failed);
        let failure = done.error.expect("error present");
        assert_eq!(failure.kind, FailureKind::Execution);
        assert!(done.result.is_none());
    }

    #[tokio::test]
    async fn slow_executor_times_out_as_failed() {
        let (store, gateway) = gateway_with(
            Arc::new(SleepyExecutor(Duration::from_secs(60))),
            Duration::from_millis(50),
        );
        let task = gateway.submit(query("stuck")).expect("accepted");
        let done = poll_until_terminal(&store, &task.id).await;
        assert_eq!(done.status, TaskStatus::Failed);
        let failure = done.error.expect("error present");
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert!(done.result.is_none());
    }
}
