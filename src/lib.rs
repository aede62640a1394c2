use std::sync::Arc;

// --- Module Structure ---

// Transport and persistence boundaries.
pub mod api;
pub mod storage;

// Domain state and its supporting types.
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod quiz;
pub mod validation;

// Path → view table.
pub mod routes;

// --- Public Re-exports ---

pub use api::{ApiClient, ApiState, HttpApiClient, MockApiClient};
pub use auth::AuthStore;
pub use config::AppConfig;
pub use error::StoreError;
pub use quiz::QuizStore;
pub use routes::{RouteMatch, Router, View};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, StorageState};

/// AppState
///
/// The one container a UI layer is handed. Both stores share the same API client, so
/// the session cookie and token picked up at sign-in apply to every later request.
/// Nothing here is global: tests and embedders build as many independent instances
/// as they like.
pub struct AppState {
    pub config: AppConfig,
    pub auth: AuthStore,
    pub quiz: QuizStore,
    pub router: Router,
}

impl AppState {
    /// Wires the real HTTP client and file-backed storage described by `config`.
    pub fn new(config: AppConfig) -> Result<Self, StoreError> {
        let api = Arc::new(HttpApiClient::new(&config.api_base_url)?) as ApiState;
        let storage = Arc::new(FileStorage::new(config.storage_path.clone())) as StorageState;
        Ok(Self::with_services(config, api, storage))
    }

    /// Wires caller-provided services; used by tests with the mock client and memory storage.
    pub fn with_services(config: AppConfig, api: ApiState, storage: StorageState) -> Self {
        Self {
            auth: AuthStore::new(api.clone(), storage),
            quiz: QuizStore::new(api),
            router: Router::new(),
            config,
        }
    }
}
