use std::sync::Arc;

use cinelog_core::film::{FilmCatalog, FilmService, FilmServiceConfig, LoggingFilmCatalog};
use cinelog_db::PgCatalogStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cinelog_db::DbPool,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Film workflow, wrapped in the logging decorator.
    pub films: Arc<dyn FilmCatalog>,
}

impl AppState {
    /// Wire the film workflow over `pool`.
    pub fn new(pool: cinelog_db::DbPool, config: ServerConfig, films: FilmServiceConfig) -> Self {
        let store = Arc::new(PgCatalogStore::new(pool.clone()));
        let catalog = LoggingFilmCatalog::new(FilmService::new(store, films));

        Self {
            pool,
            config: Arc::new(config),
            films: Arc::new(catalog),
        }
    }
}
