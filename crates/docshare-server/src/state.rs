//! Application state shared across handlers.

use std::sync::Arc;

use docshare_store::{Backend, DocumentService};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Access-checked document operations.
    service: DocumentService,
    /// Server configuration.
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Create new application state over any storage backend.
    pub fn new(backend: Arc<dyn Backend>, config: ServerConfig) -> Self {
        Self {
            service: DocumentService::new(backend),
            config: Arc::new(config),
        }
    }

    /// Get a reference to the document service.
    pub fn service(&self) -> &DocumentService {
        &self.service
    }

    /// Get a reference to the storage backend.
    pub fn store(&self) -> &dyn Backend {
        self.service.backend().as_ref()
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
