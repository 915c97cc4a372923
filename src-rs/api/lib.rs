pub use crate::error::Error;
pub use crate::gateway::SubmissionGateway;
pub use crate::status::StatusService;
pub use crate::task::{Task, TaskStatus, TaskStore};

pub mod handlers;
pub mod server;
