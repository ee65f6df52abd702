//! The capability the transport layer depends on, and a logging decorator
//! for it.

use std::time::Instant;

use async_trait::async_trait;

use crate::query::FilterSortLimit;
use crate::types::{FilmId, UserId};

use super::error::FilmError;
use super::model::{Film, FilmDraft, FilmPage};

#[async_trait]
pub trait FilmCatalog: Send + Sync {
    async fn add_film(&self, draft: FilmDraft) -> Result<Film, FilmError>;

    /// Update the film `id` on behalf of `draft.creator_id`.
    async fn update_film(&self, id: FilmId, draft: FilmDraft) -> Result<Film, FilmError>;

    async fn view_film(&self, id: FilmId) -> Result<Film, FilmError>;

    async fn view_all_films(&self, query: FilterSortLimit) -> Result<FilmPage, FilmError>;

    async fn delete_film(&self, id: FilmId, requester: UserId) -> Result<(), FilmError>;
}

/// Wraps a [`FilmCatalog`] and logs each call's outcome and latency.
///
/// Storage faults are logged at `error` with their source; caller mistakes
/// at `info`.
pub struct LoggingFilmCatalog<C> {
    inner: C,
}

impl<C> LoggingFilmCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

fn log_outcome<T>(operation: &'static str, started: Instant, result: &Result<T, FilmError>) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::debug!(operation, elapsed_ms, "Film catalog call succeeded"),
        Err(e) if e.is_internal() => match e.store_error() {
            Some(source) => {
                tracing::error!(operation, elapsed_ms, error = %e, source = %source, "Film catalog call failed")
            }
            None => tracing::error!(operation, elapsed_ms, error = %e, "Film catalog call failed"),
        },
        Err(e) => tracing::info!(operation, elapsed_ms, error = %e, "Film catalog call rejected"),
    }
}

#[async_trait]
impl<C: FilmCatalog> FilmCatalog for LoggingFilmCatalog<C> {
    async fn add_film(&self, draft: FilmDraft) -> Result<Film, FilmError> {
        let started = Instant::now();
        let result = self.inner.add_film(draft).await;
        log_outcome("add_film", started, &result);
        result
    }

    async fn update_film(&self, id: FilmId, draft: FilmDraft) -> Result<Film, FilmError> {
        let started = Instant::now();
        let result = self.inner.update_film(id, draft).await;
        log_outcome("update_film", started, &result);
        result
    }

    async fn view_film(&self, id: FilmId) -> Result<Film, FilmError> {
        let started = Instant::now();
        let result = self.inner.view_film(id).await;
        log_outcome("view_film", started, &result);
        result
    }

    async fn view_all_films(&self, query: FilterSortLimit) -> Result<FilmPage, FilmError> {
        let started = Instant::now();
        let result = self.inner.view_all_films(query).await;
        log_outcome("view_all_films", started, &result);
        result
    }

    async fn delete_film(&self, id: FilmId, requester: UserId) -> Result<(), FilmError> {
        let started = Instant::now();
        let result = self.inner.delete_film(id, requester).await;
        log_outcome("delete_film", started, &result);
        result
    }
}
