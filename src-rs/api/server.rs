use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::config::ServiceConfig;
use crate::executor::Executor;
use crate::gateway::SubmissionGateway;
use crate::status::StatusService;
use crate::task::TaskStore;

use super::handlers::{
    handle_analyze_document, handle_client_intake, handle_health, handle_legal_query,
    handle_task_status, handle_tasks,
};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<SubmissionGateway>,
    pub status: Arc<StatusService>,
    pub store: Arc<TaskStore>,
}

impl AppState {
    pub fn new(config: &ServiceConfig, executor: Arc<dyn Executor>) -> Self {
        let store = Arc::new(match &config.journal_path {
            Some(path) => TaskStore::with_journal(path.clone()),
            None => TaskStore::new(),
        });
        let gateway = Arc::new(SubmissionGateway::new(
            Arc::clone(&store),
            executor,
            config.execution_timeout(),
        ));
        let status = Arc::new(StatusService::new(Arc::clone(&store)));
        Self {
            gateway,
            status,
            store,
        }
    }
}

pub struct ApiServer {
    pub port: u16,
    pub state: AppState,
    retention_secs: Option<u64>,
}

impl ApiServer {
    pub fn new(config: &ServiceConfig, executor: Arc<dyn Executor>) -> Self {
        Self {
            port: config.port,
            state: AppState::new(config, executor),
            retention_secs: config.retention_secs,
        }
    }

    pub async fn start(&self) -> Result<(), String> {
        if let Some(secs) = self.retention_secs {
            spawn_retention_sweep(Arc::clone(&self.state.store), secs);
        }

        let app = Router::new()
            .route("/health", get(handle_health))
            .route("/api/legal-query", post(handle_legal_query))
            .route("/api/analyze-document", post(handle_analyze_document))
            .route("/api/client-intake", post(handle_client_intake))
            .route("/api/task-status/:id", get(handle_task_status))
            .route("/api/tasks", get(handle_tasks))
            .with_state(self.state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        tracing::info!(%addr, "listening");
        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .await
            .map_err(|err| err.to_string())
    }
}

fn spawn_retention_sweep(store: Arc<TaskStore>, retention_secs: u64) {
    tokio::spawn(async move {
        let retention = chrono::Duration::seconds(retention_secs as i64);
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tick.tick().await;
            store.purge_expired(retention);
        }
    });
}
