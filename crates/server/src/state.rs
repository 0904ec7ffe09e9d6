//! Application state shared across handlers.

use std::sync::Arc;

use crate::assistant::{Assistant, AssistantError};
use crate::config::ServerConfig;
use crate::db::Store;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configured store, the optional assistant, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Store,
    assistant: Option<Assistant>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The assistant is built when `config.assistant` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the assistant client cannot be built.
    pub fn new(config: ServerConfig, store: Store) -> Result<Self, AssistantError> {
        let assistant = config
            .assistant
            .as_ref()
            .map(|cfg| Assistant::new(cfg, config.summary_cache_ttl))
            .transpose()?;

        Ok(Self::with_assistant(config, store, assistant))
    }

    /// Create a state with an explicit assistant (or none).
    #[must_use]
    pub fn with_assistant(config: ServerConfig, store: Store, assistant: Option<Assistant>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                assistant,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get the assistant, if one is configured.
    #[must_use]
    pub fn assistant(&self) -> Option<&Assistant> {
        self.inner.assistant.as_ref()
    }
}
