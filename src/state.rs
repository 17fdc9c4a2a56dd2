// src/state.rs

use crate::config::AppConfig;
use crate::error::Result;
use crate::storage::{self, VisitorStore};
use std::sync::Arc;
use tracing::info;

/// Shared application state accessible by all Axum handlers.
///
/// Holds the backing store selected at startup. There is deliberately no
/// module-level singleton: the one instance is constructed here and
/// injected into the router, so handlers stay testable against any store.
pub struct AppState {
    pub store: Arc<dyn VisitorStore>,
}

impl AppState {
    /// Create the state, selecting and opening the backing store from the
    /// resolved configuration.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        info!("Creating shared AppState: selecting backing store...");
        let store = storage::build_store(config).await?;
        Ok(Self { store })
    }

    /// Wrap an already-built store. Used by tests to run the full router
    /// against a file store in a temporary directory.
    pub fn with_store(store: Arc<dyn VisitorStore>) -> Self {
        Self { store }
    }
}
