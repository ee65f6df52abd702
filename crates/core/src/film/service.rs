//! The film mutation and query workflow.
//!
//! Mutations run their steps in a fixed order: ownership check (update and
//! delete only), duplicate-title check, genre reconciliation, cast
//! reconciliation, then one atomic write. The write must see the reconciled
//! draft, so the order is not interchangeable.
//!
//! The title check is an early rejection for a friendlier error. Storage
//! enforces title uniqueness with the `uq_films_title` constraint, and a
//! violation of that constraint on write is reported the same way.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use crate::query::filter::{normalize_genre_name, FILTER_GENRES};
use crate::query::{FilmPredicate, FilterSortLimit, Pagination};
use crate::types::{FilmId, UserId};

use super::catalog::FilmCatalog;
use super::error::FilmError;
use super::model::{Cast, Film, FilmDraft, FilmPage, Genre, Named, Operation};
use super::store::{CatalogStore, StoreError};

/// Name of the storage constraint guaranteeing unique film titles.
pub const FILM_TITLE_CONSTRAINT: &str = "uq_films_title";

/// Whether unknown names of a related entity may be created on reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxonomyPolicy {
    /// Unknown names are a validation failure.
    #[default]
    Closed,
    /// Unknown names are created.
    Open,
}

#[derive(Debug, Clone, Default)]
pub struct FilmServiceConfig {
    pub genre_policy: TaxonomyPolicy,
}

pub struct FilmService<S> {
    store: Arc<S>,
    config: FilmServiceConfig,
}

impl<S: CatalogStore + 'static> FilmService<S> {
    pub fn new(store: Arc<S>, config: FilmServiceConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reject `title` if another film already uses it.
    ///
    /// For [`Operation::Update`] the film being updated is not counted.
    pub async fn check_title_unique(
        &self,
        title: &str,
        current: Option<FilmId>,
        operation: Operation,
    ) -> Result<(), FilmError> {
        let excluding = match operation {
            Operation::Add => None,
            Operation::Update => current,
        };

        let count = self
            .store
            .count_films_with_title(title, excluding)
            .await
            .map_err(FilmError::CheckExistenceFailed)?;

        if count > 0 {
            return Err(FilmError::DuplicateTitle(title.to_string()));
        }
        Ok(())
    }

    /// Resolve the draft's genres and casts to stored rows.
    ///
    /// Running this again on an already reconciled draft resolves to the same
    /// rows and creates nothing.
    pub async fn reconcile(&self, draft: &mut FilmDraft) -> Result<(), FilmError> {
        self.reconcile_genres(&mut draft.genres).await?;
        self.reconcile_casts(&mut draft.casts).await
    }

    async fn reconcile_genres(&self, genres: &mut Vec<Genre>) -> Result<(), FilmError> {
        if genres.is_empty() {
            return Ok(());
        }

        let names = unique_names(genres.iter().map(|g| normalize_genre_name(&g.name)));
        let mut known: HashMap<String, Genre> = self
            .store
            .genres_by_names(&names)
            .await
            .map_err(FilmError::GetGenresByNamesFailed)?
            .into_iter()
            .map(|g| (normalize_genre_name(&g.name), g))
            .collect();

        for genre in genres.iter_mut() {
            let key = normalize_genre_name(&genre.name);
            *genre = match known.get(&key) {
                Some(found) => found.clone(),
                None => match self.config.genre_policy {
                    TaxonomyPolicy::Closed => {
                        return Err(FilmError::validation(
                            FILTER_GENRES,
                            format!("genre {key} does not exist"),
                        ));
                    }
                    TaxonomyPolicy::Open => {
                        let created = self
                            .store
                            .create_genre(&key)
                            .await
                            .map_err(FilmError::CreateGenreFailed)?;
                        known.insert(key, created.clone());
                        created
                    }
                },
            };
        }

        dedupe_by_id(genres);
        Ok(())
    }

    async fn reconcile_casts(&self, casts: &mut Vec<Cast>) -> Result<(), FilmError> {
        if casts.is_empty() {
            return Ok(());
        }

        let names = unique_names(casts.iter().map(|c| c.name.trim().to_string()));
        let mut known: HashMap<String, Cast> = self
            .store
            .casts_by_names(&names)
            .await
            .map_err(FilmError::GetCastsByNamesFailed)?
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();

        for cast in casts.iter_mut() {
            let key = cast.name.trim().to_string();
            *cast = match known.get(&key) {
                Some(found) => found.clone(),
                None => {
                    let created = self
                        .store
                        .create_cast(&key)
                        .await
                        .map_err(FilmError::CreateCastFailed)?;
                    known.insert(key, created.clone());
                    created
                }
            };
        }

        dedupe_by_id(casts);
        Ok(())
    }

    /// Swap genre-name predicates for genre-ID predicates.
    ///
    /// A genre filter naming no known genre is rejected rather than yielding
    /// an empty page.
    async fn resolve_genre_filters(
        &self,
        predicates: Vec<FilmPredicate>,
    ) -> Result<Vec<FilmPredicate>, FilmError> {
        let mut resolved = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            match predicate {
                FilmPredicate::GenreNames(names) => {
                    let ids: Vec<_> = self
                        .store
                        .genres_by_names(&names)
                        .await
                        .map_err(FilmError::GetGenresByNamesFailed)?
                        .into_iter()
                        .filter_map(|g| g.id)
                        .collect();
                    if ids.is_empty() {
                        return Err(FilmError::validation(FILTER_GENRES, "no matching genres"));
                    }
                    resolved.push(FilmPredicate::GenreIds(ids));
                }
                other => resolved.push(other),
            }
        }
        Ok(resolved)
    }

    async fn load(&self, id: FilmId) -> Result<Film, FilmError> {
        self.store
            .find_film(id)
            .await
            .map_err(FilmError::FilmFindFailed)?
            .ok_or(FilmError::NotFound(id))
    }
}

#[async_trait]
impl<S: CatalogStore + 'static> FilmCatalog for FilmService<S> {
    async fn add_film(&self, mut draft: FilmDraft) -> Result<Film, FilmError> {
        self.check_title_unique(&draft.title, None, Operation::Add)
            .await
            .map_err(title_conflict)?;
        self.reconcile(&mut draft).await?;

        let film = self.store.create_film(&draft).await.map_err(|e| {
            if e.is_unique_violation_of(FILM_TITLE_CONSTRAINT) {
                title_conflict(FilmError::DuplicateTitle(draft.title.clone()))
            } else {
                FilmError::FilmCreateFailed(e)
            }
        })?;

        tracing::info!(film_id = %film.id, creator_id = %film.creator.id, "Film created");
        Ok(film)
    }

    async fn update_film(&self, id: FilmId, mut draft: FilmDraft) -> Result<Film, FilmError> {
        let mut film = self.load(id).await?;

        if film.creator.id != draft.creator_id {
            return Err(FilmError::Permission);
        }

        self.check_title_unique(&draft.title, Some(film.id), Operation::Update)
            .await
            .map_err(title_conflict)?;
        self.reconcile(&mut draft).await?;
        film.apply_draft(draft);

        let updated = self
            .store
            .update_film(&film)
            .await
            .map_err(|e: StoreError| {
                if e.is_unique_violation_of(FILM_TITLE_CONSTRAINT) {
                    title_conflict(FilmError::DuplicateTitle(film.title.clone()))
                } else {
                    FilmError::FilmUpdateFailed(e)
                }
            })?
            .ok_or(FilmError::NotFound(id))?;

        tracing::info!(film_id = %updated.id, "Film updated");
        Ok(updated)
    }

    async fn view_film(&self, id: FilmId) -> Result<Film, FilmError> {
        self.store
            .find_film_for_view(id)
            .await
            .map_err(FilmError::FilmFindFailed)?
            .ok_or(FilmError::NotFound(id))
    }

    async fn view_all_films(&self, query: FilterSortLimit) -> Result<FilmPage, FilmError> {
        let predicates = self.resolve_genre_filters(query.filter.translate()?).await?;
        let offset = query.effective_offset();

        let items = self
            .store
            .find_all_films(&predicates, query.sort.as_ref(), query.limit, offset)
            .await
            .map_err(FilmError::FilmFindAllFailed)?;
        let total = self
            .store
            .count_films(&predicates)
            .await
            .map_err(FilmError::FilmCountFailed)?;

        Ok(FilmPage {
            items,
            pagination: Pagination::compute(total, query.limit, offset),
        })
    }

    async fn delete_film(&self, id: FilmId, requester: UserId) -> Result<(), FilmError> {
        let film = self.load(id).await?;

        if film.creator.id != requester {
            return Err(FilmError::Permission);
        }

        let deleted = self
            .store
            .delete_film(id)
            .await
            .map_err(FilmError::FilmDeleteFailed)?;
        if !deleted {
            return Err(FilmError::NotFound(id));
        }

        tracing::info!(film_id = %id, "Film deleted");
        Ok(())
    }
}

/// Report a duplicate title as a validation failure on `title`.
fn title_conflict(err: FilmError) -> FilmError {
    match err {
        FilmError::DuplicateTitle(title) => {
            FilmError::validation("title", format!("film with title '{title}' already exists"))
        }
        other => other,
    }
}

fn unique_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names.filter(|n| seen.insert(n.clone())).collect()
}

fn dedupe_by_id(items: &mut Vec<Named>) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.id));
}
