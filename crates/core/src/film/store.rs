//! Storage capabilities the film workflow depends on.
//!
//! Each trait is a narrow slice of what storage offers, so a workflow step can
//! be exercised against an in-memory double. `cinelog-db` provides the
//! Postgres implementation.

use async_trait::async_trait;

use crate::query::{FilmPredicate, SortOption};
use crate::types::FilmId;

use super::model::{Cast, Film, FilmDraft, Genre};

/// Storage faults, already stripped of driver types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("foreign key violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("{0} was not resolved before persisting")]
    Unresolved(&'static str),

    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_unique_violation_of(&self, name: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint == name)
    }
}

#[async_trait]
pub trait FilmStore: Send + Sync {
    /// Count films titled exactly `title`, ignoring `excluding` if given.
    async fn count_films_with_title(
        &self,
        title: &str,
        excluding: Option<FilmId>,
    ) -> Result<i64, StoreError>;

    /// Load a film with director, genres and casts.
    async fn find_film(&self, id: FilmId) -> Result<Option<Film>, StoreError>;

    /// Like [`find_film`](FilmStore::find_film) but also loads the creator's
    /// username.
    async fn find_film_for_view(&self, id: FilmId) -> Result<Option<Film>, StoreError>;

    /// A page of films matching every predicate. Genre predicates must
    /// already be resolved to IDs.
    async fn find_all_films(
        &self,
        predicates: &[FilmPredicate],
        sort: Option<&SortOption>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Film>, StoreError>;

    async fn count_films(&self, predicates: &[FilmPredicate]) -> Result<i64, StoreError>;

    /// Persist a new film in one transaction: upsert its director by name,
    /// insert the film row, then the genre and cast links.
    ///
    /// Genres and casts must carry IDs.
    async fn create_film(&self, draft: &FilmDraft) -> Result<Film, StoreError>;

    /// Persist `film`'s mutable attributes and replace its links, in one
    /// transaction. `None` if the film no longer exists.
    async fn update_film(&self, film: &Film) -> Result<Option<Film>, StoreError>;

    /// `false` if nothing was deleted.
    async fn delete_film(&self, id: FilmId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait GenreStore: Send + Sync {
    /// Genres whose lower-cased name is in `names`. Unknown names are
    /// omitted.
    async fn genres_by_names(&self, names: &[String]) -> Result<Vec<Genre>, StoreError>;

    async fn create_genre(&self, name: &str) -> Result<Genre, StoreError>;
}

#[async_trait]
pub trait CastStore: Send + Sync {
    /// Casts whose name is exactly in `names`. Unknown names are omitted.
    async fn casts_by_names(&self, names: &[String]) -> Result<Vec<Cast>, StoreError>;

    /// Create a cast, or return the existing one with that name.
    async fn create_cast(&self, name: &str) -> Result<Cast, StoreError>;
}

/// Everything the film service needs from storage.
pub trait CatalogStore: FilmStore + GenreStore + CastStore {}

impl<T: FilmStore + GenreStore + CastStore> CatalogStore for T {}
