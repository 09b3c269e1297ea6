//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PessoasConfig;
use crate::db::PersonStore;
use crate::services::PersonService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration and the person store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PessoasConfig,
    store: Arc<dyn PersonStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: PessoasConfig, store: Arc<dyn PersonStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &PessoasConfig {
        &self.inner.config
    }

    /// Get a reference to the person store.
    #[must_use]
    pub fn store(&self) -> &dyn PersonStore {
        self.inner.store.as_ref()
    }

    /// Person operations over the shared store.
    #[must_use]
    pub fn people(&self) -> PersonService<'_> {
        PersonService::new(self.store())
    }
}
