//! Film rows and DTOs.

use chrono::NaiveDate;
use sqlx::FromRow;
use cinelog_core::film::Named;
use cinelog_core::types::{DbId, FilmId, Timestamp, UserId};

/// A bare row from the `films` table.
#[derive(Debug, Clone, FromRow)]
pub struct FilmRecord {
    pub id: FilmId,
    pub creator_id: UserId,
    pub director_id: DbId,
    pub title: String,
    pub release_date: NaiveDate,
    pub synopsis: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A `films` row joined with its director and, on view reads, its creator.
#[derive(Debug, Clone, FromRow)]
pub struct FilmRow {
    pub id: FilmId,
    pub creator_id: UserId,
    #[sqlx(default)]
    pub creator_username: Option<String>,
    pub director_id: DbId,
    pub director_name: String,
    pub title: String,
    pub release_date: NaiveDate,
    pub synopsis: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A genre or cast linked to a film through a join table.
#[derive(Debug, Clone, FromRow)]
pub struct FilmLink {
    pub film_id: FilmId,
    pub id: DbId,
    pub name: String,
}

impl From<FilmLink> for Named {
    fn from(link: FilmLink) -> Self {
        Named::persisted(link.id, link.name)
    }
}

/// DTO for inserting a film. The director must already exist.
#[derive(Debug, Clone)]
pub struct CreateFilm {
    pub creator_id: UserId,
    pub director_id: DbId,
    pub title: String,
    pub release_date: NaiveDate,
    pub synopsis: String,
}

/// DTO for overwriting a film's mutable columns.
#[derive(Debug, Clone)]
pub struct UpdateFilm {
    pub director_id: DbId,
    pub title: String,
    pub release_date: NaiveDate,
    pub synopsis: String,
}
