use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    LegalQuery,
    DocumentAnalysis,
    ClientIntake,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegalQuery => write!(f, "legal_query"),
            Self::DocumentAnalysis => write!(f, "document_analysis"),
            Self::ClientIntake => write!(f, "client_intake"),
        }
    }
}

/// Task lifecycle status. `completed` and `failed` are terminal: once a
/// record reaches either, it never changes again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Legal moves: `pending -> processing | completed | failed` and
    /// `processing -> completed | failed`. Everything else, including
    /// self-transitions, is rejected.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                TaskStatus::Processing | TaskStatus::Completed | TaskStatus::Failed
            ),
            Self::Processing => matches!(next, TaskStatus::Completed | TaskStatus::Failed),
            Self::Completed | Self::Failed => false,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    #[default]
    Comprehensive,
    RiskAssessment,
    ContractReview,
    Compliance,
}

impl AnalysisType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "comprehensive" => Some(Self::Comprehensive),
            "risk_assessment" => Some(Self::RiskAssessment),
            "contract_review" => Some(Self::ContractReview),
            "compliance" => Some(Self::Compliance),
            _ => None,
        }
    }

    /// Focus area handed to the reasoning backend.
    pub fn focus(&self) -> &'static str {
        match self {
            Self::Comprehensive => "general",
            Self::RiskAssessment => "risk",
            Self::ContractReview => "contract",
            Self::Compliance => "compliance",
        }
    }
}

/// Client profile inferred from the case type; steers tone and depth of the
/// generated advice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Citizen,
    Business,
    Lawyer,
}

impl ClientType {
    pub fn for_case(case_type: &str) -> Self {
        match case_type {
            "corporate" | "intellectual_property" | "business" => Self::Business,
            "complex_litigation" | "appeals" => Self::Lawyer,
            _ => Self::Citizen,
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Citizen => write!(f, "citizen"),
            Self::Business => write!(f, "business"),
            Self::Lawyer => write!(f, "lawyer"),
        }
    }
}

/// Canonical, validated input for one task. Immutable after creation; the
/// variant tag is the task's kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskPayload {
    LegalQuery {
        query: String,
        case_type: String,
        jurisdiction: String,
        urgency: String,
        additional_context: Option<String>,
    },
    DocumentAnalysis {
        document_text: Option<String>,
        file_reference: Option<String>,
        analysis_type: AnalysisType,
        specific_sections: Option<Vec<String>>,
    },
    ClientIntake {
        client_name: String,
        case_description: String,
        case_type: String,
        jurisdiction: String,
        preferred_outcome: Option<String>,
        budget_range: Option<String>,
        timeline: Option<String>,
    },
}

impl TaskPayload {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::LegalQuery { .. } => TaskKind::LegalQuery,
            Self::DocumentAnalysis { .. } => TaskKind::DocumentAnalysis,
            Self::ClientIntake { .. } => TaskKind::ClientIntake,
        }
    }

    pub fn client_type(&self) -> ClientType {
        match self {
            Self::LegalQuery { case_type, .. } | Self::ClientIntake { case_type, .. } => {
                ClientType::for_case(case_type)
            }
            Self::DocumentAnalysis { .. } => ClientType::Citizen,
        }
    }

    /// Composes the working brief the executor operates on.
    pub fn brief(&self) -> String {
        match self {
            Self::LegalQuery {
                query,
                additional_context,
                ..
            } => match additional_context {
                Some(context) => format!("{}\n\nAdditional Context: {}", query, context),
                None => query.clone(),
            },
            Self::DocumentAnalysis {
                document_text,
                file_reference,
                analysis_type,
                specific_sections,
            } => {
                let mut body = match document_text {
                    Some(text) => text.clone(),
                    None => format!(
                        "[document reference: {}]",
                        file_reference.as_deref().unwrap_or("unknown")
                    ),
                };
                if let Some(sections) = specific_sections {
                    if !sections.is_empty() {
                        body.push_str(&format!("\n\nFocus sections: {}", sections.join(", ")));
                    }
                }
                format!("Analysis focus: {}\n\n{}", analysis_type.focus(), body)
            }
            Self::ClientIntake {
                client_name,
                case_description,
                case_type,
                jurisdiction,
                preferred_outcome,
                budget_range,
                timeline,
            } => format!(
                "Client Name: {}\nCase Type: {}\n\nCase Description:\n{}\n\n\
                 Jurisdiction: {}\nPreferred Outcome: {}\nBudget Range: {}\nTimeline: {}\n\n\
                 Please provide comprehensive legal advice and next steps for this client.",
                client_name,
                case_type,
                case_description,
                jurisdiction,
                preferred_outcome.as_deref().unwrap_or("Not specified"),
                budget_range.as_deref().unwrap_or("Not specified"),
                timeline.as_deref().unwrap_or("Not specified"),
            ),
        }
    }
}

/// Output of a successful execution: the generated text plus metadata such
/// as the generating agent and elapsed time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub output: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Execution,
    Timeout,
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Execution => write!(f, "execution"),
            Self::Timeout => write!(f, "timeout"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TaskFailure {
    pub fn execution(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Execution,
            message: message.into(),
        }
    }

    pub fn timeout(after: std::time::Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: format!("execution exceeded {}s", after.as_secs()),
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub payload: TaskPayload,
    pub status: TaskStatus,
    pub result: Option<TaskOutput>,
    pub error: Option<TaskFailure>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        self.payload.kind()
    }
}
