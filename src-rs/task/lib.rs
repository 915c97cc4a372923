pub mod store;
pub mod types;

pub use store::{TaskStore, Transition};
pub use types::{
    AnalysisType, ClientType, FailureKind, Task, TaskFailure, TaskKind, TaskOutput, TaskPayload,
    TaskStatus,
};
