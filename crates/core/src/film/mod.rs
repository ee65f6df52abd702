//! Film aggregate, storage capabilities and the mutation workflow.

pub mod catalog;
pub mod error;
pub mod model;
pub mod service;
pub mod store;

#[cfg(test)]
mod memory;

pub use catalog::{FilmCatalog, LoggingFilmCatalog};
pub use error::FilmError;
pub use model::{
    Cast, Creator, Director, Film, FilmDraft, FilmPage, Genre, Named, Operation, DEFAULT_FILM_SORT,
    FILM_SORT_FIELDS,
};
pub use service::{FilmService, FilmServiceConfig, TaxonomyPolicy, FILM_TITLE_CONSTRAINT};
pub use store::{CastStore, CatalogStore, FilmStore, GenreStore, StoreError};
