//! Postgres implementation of the film workflow's storage capabilities.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use cinelog_core::film::{
    Cast, CastStore, Creator, Film, FilmDraft, FilmStore, Genre, GenreStore, Named, StoreError,
};
use cinelog_core::query::{FilmPredicate, SortOption};
use cinelog_core::types::{DbId, FilmId};

use crate::models::film::{CreateFilm, FilmLink, FilmRecord, FilmRow, UpdateFilm};
use crate::repositories::{CastRepo, DirectorRepo, FilmRepo, GenreRepo};

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL error code for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Translate a driver error into a [`StoreError`].
pub fn to_store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default().to_string();
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::UniqueViolation { constraint },
            Some(FOREIGN_KEY_VIOLATION) => return StoreError::ForeignKeyViolation { constraint },
            _ => {}
        }
    }
    StoreError::Backend(err.to_string())
}

/// Collect the IDs of reconciled items.
fn resolved_ids(items: &[Named], what: &'static str) -> Result<Vec<DbId>, StoreError> {
    items
        .iter()
        .map(|item| item.id.ok_or(StoreError::Unresolved(what)))
        .collect()
}

fn group_links(links: Vec<FilmLink>) -> HashMap<FilmId, Vec<Named>> {
    let mut grouped: HashMap<FilmId, Vec<Named>> = HashMap::new();
    for link in links {
        grouped.entry(link.film_id).or_default().push(link.into());
    }
    grouped
}

fn film_from_row(row: FilmRow, genres: Vec<Genre>, casts: Vec<Cast>) -> Film {
    Film {
        id: row.id,
        title: row.title,
        director: Named::persisted(row.director_id, row.director_name),
        release_date: row.release_date,
        synopsis: row.synopsis,
        creator: Creator {
            id: row.creator_id,
            username: row.creator_username,
        },
        genres,
        casts,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn film_from_record(
    record: FilmRecord,
    director: Named,
    genres: Vec<Genre>,
    casts: Vec<Cast>,
) -> Film {
    Film {
        id: record.id,
        title: record.title,
        director,
        release_date: record.release_date,
        synopsis: record.synopsis,
        creator: Creator {
            id: record.creator_id,
            username: None,
        },
        genres,
        casts,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

/// Storage adapter over a connection pool.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach genres and casts to `rows` with one query each.
    async fn hydrate(&self, rows: Vec<FilmRow>) -> Result<Vec<Film>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<FilmId> = rows.iter().map(|r| r.id).collect();
        let mut genres = group_links(FilmRepo::genres_for(&self.pool, &ids).await?);
        let mut casts = group_links(FilmRepo::casts_for(&self.pool, &ids).await?);

        Ok(rows
            .into_iter()
            .map(|row| {
                let film_genres = genres.remove(&row.id).unwrap_or_default();
                let film_casts = casts.remove(&row.id).unwrap_or_default();
                film_from_row(row, film_genres, film_casts)
            })
            .collect())
    }

    async fn hydrate_one(&self, row: Option<FilmRow>) -> Result<Option<Film>, sqlx::Error> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl FilmStore for PgCatalogStore {
    async fn count_films_with_title(
        &self,
        title: &str,
        excluding: Option<FilmId>,
    ) -> Result<i64, StoreError> {
        FilmRepo::count_by_title(&self.pool, title, excluding)
            .await
            .map_err(to_store_error)
    }

    async fn find_film(&self, id: FilmId) -> Result<Option<Film>, StoreError> {
        let row = FilmRepo::find_by_id(&self.pool, id)
            .await
            .map_err(to_store_error)?;
        self.hydrate_one(row).await.map_err(to_store_error)
    }

    async fn find_film_for_view(&self, id: FilmId) -> Result<Option<Film>, StoreError> {
        let row = FilmRepo::find_for_view(&self.pool, id)
            .await
            .map_err(to_store_error)?;
        self.hydrate_one(row).await.map_err(to_store_error)
    }

    async fn find_all_films(
        &self,
        predicates: &[FilmPredicate],
        sort: Option<&SortOption>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Film>, StoreError> {
        let rows = FilmRepo::list(&self.pool, predicates, sort, limit, offset)
            .await
            .map_err(to_store_error)?;
        self.hydrate(rows).await.map_err(to_store_error)
    }

    async fn count_films(&self, predicates: &[FilmPredicate]) -> Result<i64, StoreError> {
        FilmRepo::count(&self.pool, predicates)
            .await
            .map_err(to_store_error)
    }

    async fn create_film(&self, draft: &FilmDraft) -> Result<Film, StoreError> {
        let genre_ids = resolved_ids(&draft.genres, "genre")?;
        let cast_ids = resolved_ids(&draft.casts, "cast")?;

        let mut tx = self.pool.begin().await.map_err(to_store_error)?;

        let director = DirectorRepo::find_or_create(&mut *tx, &draft.director.name)
            .await
            .map_err(to_store_error)?;
        let input = CreateFilm {
            creator_id: draft.creator_id,
            director_id: director.id,
            title: draft.title.clone(),
            release_date: draft.release_date,
            synopsis: draft.synopsis.clone(),
        };
        let record = FilmRepo::insert(&mut *tx, &input)
            .await
            .map_err(to_store_error)?;
        FilmRepo::replace_genres(&mut *tx, record.id, &genre_ids)
            .await
            .map_err(to_store_error)?;
        FilmRepo::replace_casts(&mut *tx, record.id, &cast_ids)
            .await
            .map_err(to_store_error)?;

        tx.commit().await.map_err(to_store_error)?;

        Ok(film_from_record(
            record,
            director.into(),
            draft.genres.clone(),
            draft.casts.clone(),
        ))
    }

    async fn update_film(&self, film: &Film) -> Result<Option<Film>, StoreError> {
        let genre_ids = resolved_ids(&film.genres, "genre")?;
        let cast_ids = resolved_ids(&film.casts, "cast")?;

        let mut tx = self.pool.begin().await.map_err(to_store_error)?;

        let director = DirectorRepo::find_or_create(&mut *tx, &film.director.name)
            .await
            .map_err(to_store_error)?;
        let input = UpdateFilm {
            director_id: director.id,
            title: film.title.clone(),
            release_date: film.release_date,
            synopsis: film.synopsis.clone(),
        };
        let Some(record) = FilmRepo::update(&mut *tx, film.id, &input)
            .await
            .map_err(to_store_error)?
        else {
            // Dropping `tx` rolls back the director upsert.
            return Ok(None);
        };
        FilmRepo::replace_genres(&mut *tx, film.id, &genre_ids)
            .await
            .map_err(to_store_error)?;
        FilmRepo::replace_casts(&mut *tx, film.id, &cast_ids)
            .await
            .map_err(to_store_error)?;

        tx.commit().await.map_err(to_store_error)?;

        Ok(Some(film_from_record(
            record,
            director.into(),
            film.genres.clone(),
            film.casts.clone(),
        )))
    }

    async fn delete_film(&self, id: FilmId) -> Result<bool, StoreError> {
        FilmRepo::delete(&self.pool, id)
            .await
            .map_err(to_store_error)
    }
}

#[async_trait]
impl GenreStore for PgCatalogStore {
    async fn genres_by_names(&self, names: &[String]) -> Result<Vec<Genre>, StoreError> {
        let rows = GenreRepo::find_by_names(&self.pool, names)
            .await
            .map_err(to_store_error)?;
        Ok(rows.into_iter().map(Named::from).collect())
    }

    async fn create_genre(&self, name: &str) -> Result<Genre, StoreError> {
        GenreRepo::create_or_get(&self.pool, name)
            .await
            .map(Named::from)
            .map_err(to_store_error)
    }
}

#[async_trait]
impl CastStore for PgCatalogStore {
    async fn casts_by_names(&self, names: &[String]) -> Result<Vec<Cast>, StoreError> {
        let rows = CastRepo::find_by_names(&self.pool, names)
            .await
            .map_err(to_store_error)?;
        Ok(rows.into_iter().map(Named::from).collect())
    }

    async fn create_cast(&self, name: &str) -> Result<Cast, StoreError> {
        CastRepo::create_or_get(&self.pool, name)
            .await
            .map(Named::from)
            .map_err(to_store_error)
    }
}
