//! Film aggregate and the draft a mutation starts from.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::query::filter::normalize_genre_name;
use crate::query::Pagination;
use crate::types::{DbId, FilmId, Timestamp, UserId};

use super::error::FilmError;

/// Fields a film listing may be sorted by.
pub const FILM_SORT_FIELDS: &[&str] = &["title", "release_date"];

/// Ordering applied when the caller supplies none.
pub const DEFAULT_FILM_SORT: &str = "release_date.desc";

/// A name-keyed lookup entity (genre, cast member, director).
///
/// `id` is `None` until the entity has been matched against, or created in,
/// storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Named {
    pub id: Option<DbId>,
    pub name: String,
}

impl Named {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn persisted(id: DbId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }
}

pub type Genre = Named;
pub type Cast = Named;
pub type Director = Named;

/// The user who created a film. `username` is only populated on reads that
/// join the users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Creator {
    pub id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A persisted film with its associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Film {
    pub id: FilmId,
    pub title: String,
    pub director: Director,
    pub release_date: NaiveDate,
    pub synopsis: String,
    pub creator: Creator,
    pub genres: Vec<Genre>,
    pub casts: Vec<Cast>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Film {
    /// Overwrite the mutable attributes with the draft's.
    ///
    /// The film's id and creator are never taken from the draft.
    pub fn apply_draft(&mut self, draft: FilmDraft) {
        self.title = draft.title;
        self.director = draft.director;
        self.release_date = draft.release_date;
        self.synopsis = draft.synopsis;
        self.genres = draft.genres;
        self.casts = draft.casts;
    }
}

/// Mutation input: a film as submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilmDraft {
    pub creator_id: UserId,
    pub title: String,
    pub director: Director,
    pub release_date: NaiveDate,
    pub synopsis: String,
    pub genres: Vec<Genre>,
    pub casts: Vec<Cast>,
}

impl FilmDraft {
    pub fn new(
        creator_id: UserId,
        title: impl Into<String>,
        director: impl Into<String>,
        release_date: NaiveDate,
        synopsis: impl Into<String>,
    ) -> Self {
        Self {
            creator_id,
            title: title.into(),
            director: Named::new(director),
            release_date,
            synopsis: synopsis.into(),
            genres: Vec::new(),
            casts: Vec::new(),
        }
    }

    /// Genre names are stored lower-cased.
    pub fn with_genres<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        self.genres = names
            .into_iter()
            .map(|n| Named::new(normalize_genre_name(n.as_ref())))
            .collect();
        self
    }

    pub fn with_casts<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        self.casts = names
            .into_iter()
            .map(|n| Named::new(n.as_ref().trim()))
            .collect();
        self
    }
}

/// Which mutation a title-uniqueness check is guarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Update,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Update => "update",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = FilmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Operation::Add),
            "update" => Ok(Operation::Update),
            other => Err(FilmError::UnknownOperation(other.to_string())),
        }
    }
}

/// One page of a film listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmPage {
    pub items: Vec<Film>,
    pub pagination: Pagination,
}
