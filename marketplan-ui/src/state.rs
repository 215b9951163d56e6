//! Shared application state for the UI server.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use marketplan::gateway::{HttpModelClient, ModelClient};
use marketplan::io::config::ModelConfig;
use marketplan::project::Project;
use tokio::sync::{Mutex, broadcast};
use tracing::warn;

/// Events broadcast to SSE clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    PlanChanged,
    StepChanged,
    ConfigChanged,
}

/// Builds a model client for one generation call.
///
/// Called on a blocking thread; the HTTP client is created and dropped there.
pub type ClientFactory = Arc<dyn Fn() -> anyhow::Result<Box<dyn ModelClient>> + Send + Sync>;

pub fn http_client_factory(config: ModelConfig) -> ClientFactory {
    Arc::new(move || {
        let client = HttpModelClient::from_config(&config)?;
        Ok(Box::new(client) as Box<dyn ModelClient>)
    })
}

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single editing session. Never held across a model call.
    pub project: Arc<Mutex<Project>>,
    pub client_factory: ClientFactory,
    /// Broadcast sender for change events.
    pub event_tx: Arc<broadcast::Sender<ChangeEvent>>,
    pub config_path: PathBuf,
    /// Bumped each time the store bridge is re-subscribed.
    pub bridge_generation: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(project: Project, client_factory: ClientFactory) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            config_path: project.paths.config_path.clone(),
            project: Arc::new(Mutex::new(project)),
            client_factory,
            event_tx: Arc::new(event_tx),
            bridge_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn notify(&self, event: ChangeEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Persist the session; failures are logged and otherwise ignored.
    pub fn remember(&self, project: &Project) {
        if let Err(err) = project.save_session() {
            warn!(error = %format!("{err:#}"), "could not save session");
        }
    }
}
