//! API state management for the REST server.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::backend::RefundBackend;
use crate::config::Config;
use crate::rest::store::SessionStore;

/// Shared state for the REST API
#[derive(Clone)]
pub struct ApiState {
    /// Wizard sessions (one per browser run)
    pub sessions: Arc<RwLock<SessionStore>>,
    /// Email lookup, submission and status collaborators
    pub backend: Arc<dyn RefundBackend>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl ApiState {
    pub fn new(config: Config, backend: Arc<dyn RefundBackend>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(SessionStore::new())),
            backend,
            config: Arc::new(config),
        }
    }
}
