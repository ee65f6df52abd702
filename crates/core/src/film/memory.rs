//! In-memory [`CatalogStore`](super::store::CatalogStore) used by the
//! workflow tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::query::filter::normalize_genre_name;
use crate::query::{FilmPredicate, SortDirection, SortOption};
use crate::types::{DbId, FilmId, UserId};

use super::model::{Cast, Creator, Director, Film, FilmDraft, Genre, Named};
use super::service::FILM_TITLE_CONSTRAINT;
use super::store::{CastStore, FilmStore, GenreStore, StoreError};

#[derive(Default)]
struct State {
    next_id: DbId,
    films: Vec<Film>,
    genres: Vec<Genre>,
    casts: Vec<Cast>,
    directors: Vec<Director>,
    usernames: HashMap<UserId, String>,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<State>,
    failing: Mutex<HashSet<&'static str>>,
    /// When set, the title count always reports zero, so only the unique
    /// constraint stands between two films with one title.
    pub(crate) blind_title_check: AtomicBool,
    pub(crate) genre_lookups: AtomicUsize,
    pub(crate) cast_lookups: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn with_genres(names: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for name in names {
                let id = state.next_id();
                state.genres.push(Named::persisted(id, *name));
            }
        }
        store
    }

    pub(crate) fn add_user(&self, id: UserId, username: &str) {
        self.state.lock().unwrap().usernames.insert(id, username.to_string());
    }

    /// Make every later call to `operation` fail with a backend error.
    pub(crate) fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub(crate) fn films(&self) -> Vec<Film> {
        self.state.lock().unwrap().films.clone()
    }

    pub(crate) fn genres(&self) -> Vec<Genre> {
        self.state.lock().unwrap().genres.clone()
    }

    pub(crate) fn casts(&self) -> Vec<Cast> {
        self.state.lock().unwrap().casts.clone()
    }

    pub(crate) fn directors(&self) -> Vec<Director> {
        self.state.lock().unwrap().directors.clone()
    }

    fn check(&self, operation: &'static str) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(operation) {
            return Err(StoreError::Backend(format!("{operation} unavailable")));
        }
        Ok(())
    }
}

fn upsert_director(state: &mut State, director: &Director) -> Director {
    if let Some(found) = state.directors.iter().find(|d| d.name == director.name) {
        return found.clone();
    }
    let created = Named::persisted(state.next_id(), director.name.clone());
    state.directors.push(created.clone());
    created
}

fn require_ids(items: &[Named], what: &'static str) -> Result<(), StoreError> {
    if items.iter().all(Named::is_resolved) {
        Ok(())
    } else {
        Err(StoreError::Unresolved(what))
    }
}

fn matches(film: &Film, predicate: &FilmPredicate) -> Result<bool, StoreError> {
    Ok(match predicate {
        FilmPredicate::TitleContains(needle) => film.title.contains(needle.as_str()),
        FilmPredicate::ReleasedOn(date) => film.release_date == *date,
        FilmPredicate::ReleasedBetween(from, to) => (*from..=*to).contains(&film.release_date),
        FilmPredicate::GenreIds(ids) => film.genres.iter().any(|g| g.id.is_some_and(|id| ids.contains(&id))),
        FilmPredicate::GenreNames(_) => return Err(StoreError::Unresolved("genre filter")),
    })
}

fn filtered(state: &State, predicates: &[FilmPredicate]) -> Result<Vec<Film>, StoreError> {
    let mut out = Vec::new();
    for film in &state.films {
        let mut keep = true;
        for predicate in predicates {
            keep &= matches(film, predicate)?;
        }
        if keep {
            out.push(film.clone());
        }
    }
    Ok(out)
}

#[async_trait]
impl FilmStore for MemoryStore {
    async fn count_films_with_title(
        &self,
        title: &str,
        excluding: Option<FilmId>,
    ) -> Result<i64, StoreError> {
        self.check("count_films_with_title")?;
        if self.blind_title_check.load(Ordering::SeqCst) {
            return Ok(0);
        }
        let state = self.state.lock().unwrap();
        let count = state
            .films
            .iter()
            .filter(|f| f.title == title && Some(f.id) != excluding)
            .count();
        Ok(count as i64)
    }

    async fn find_film(&self, id: FilmId) -> Result<Option<Film>, StoreError> {
        self.check("find_film")?;
        let state = self.state.lock().unwrap();
        Ok(state.films.iter().find(|f| f.id == id).cloned())
    }

    async fn find_film_for_view(&self, id: FilmId) -> Result<Option<Film>, StoreError> {
        self.check("find_film_for_view")?;
        let state = self.state.lock().unwrap();
        Ok(state.films.iter().find(|f| f.id == id).cloned().map(|mut film| {
            film.creator.username = state.usernames.get(&film.creator.id).cloned();
            film
        }))
    }

    async fn find_all_films(
        &self,
        predicates: &[FilmPredicate],
        sort: Option<&SortOption>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Film>, StoreError> {
        self.check("find_all_films")?;
        let state = self.state.lock().unwrap();
        let mut films = filtered(&state, predicates)?;

        let (field, direction) = sort
            .map(|s| (s.field().to_string(), s.direction()))
            .unwrap_or_else(|| ("release_date".to_string(), SortDirection::Desc));
        films.sort_by(|a, b| {
            let ord = match field.as_str() {
                "title" => a.title.cmp(&b.title),
                _ => a.release_date.cmp(&b.release_date),
            };
            let ord = match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            ord.then(a.id.cmp(&b.id))
        });

        Ok(films
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_films(&self, predicates: &[FilmPredicate]) -> Result<i64, StoreError> {
        self.check("count_films")?;
        let state = self.state.lock().unwrap();
        Ok(filtered(&state, predicates)?.len() as i64)
    }

    async fn create_film(&self, draft: &FilmDraft) -> Result<Film, StoreError> {
        self.check("create_film")?;
        require_ids(&draft.genres, "genre")?;
        require_ids(&draft.casts, "cast")?;

        let mut state = self.state.lock().unwrap();
        if state.films.iter().any(|f| f.title == draft.title) {
            return Err(StoreError::UniqueViolation {
                constraint: FILM_TITLE_CONSTRAINT.to_string(),
            });
        }

        let director = upsert_director(&mut state, &draft.director);
        let now = Utc::now();
        let film = Film {
            id: FilmId::new_v4(),
            title: draft.title.clone(),
            director,
            release_date: draft.release_date,
            synopsis: draft.synopsis.clone(),
            creator: Creator {
                id: draft.creator_id,
                username: None,
            },
            genres: draft.genres.clone(),
            casts: draft.casts.clone(),
            created_at: now,
            updated_at: now,
        };
        state.films.push(film.clone());
        Ok(film)
    }

    async fn update_film(&self, film: &Film) -> Result<Option<Film>, StoreError> {
        self.check("update_film")?;
        require_ids(&film.genres, "genre")?;
        require_ids(&film.casts, "cast")?;

        let mut state = self.state.lock().unwrap();
        if state.films.iter().any(|f| f.title == film.title && f.id != film.id) {
            return Err(StoreError::UniqueViolation {
                constraint: FILM_TITLE_CONSTRAINT.to_string(),
            });
        }

        let director = upsert_director(&mut state, &film.director);
        let Some(stored) = state.films.iter_mut().find(|f| f.id == film.id) else {
            return Ok(None);
        };
        stored.title = film.title.clone();
        stored.director = director;
        stored.release_date = film.release_date;
        stored.synopsis = film.synopsis.clone();
        stored.genres = film.genres.clone();
        stored.casts = film.casts.clone();
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_film(&self, id: FilmId) -> Result<bool, StoreError> {
        self.check("delete_film")?;
        let mut state = self.state.lock().unwrap();
        let before = state.films.len();
        state.films.retain(|f| f.id != id);
        Ok(state.films.len() != before)
    }
}

#[async_trait]
impl GenreStore for MemoryStore {
    async fn genres_by_names(&self, names: &[String]) -> Result<Vec<Genre>, StoreError> {
        self.check("genres_by_names")?;
        self.genre_lookups.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .genres
            .iter()
            .filter(|g| names.contains(&normalize_genre_name(&g.name)))
            .cloned()
            .collect())
    }

    async fn create_genre(&self, name: &str) -> Result<Genre, StoreError> {
        self.check("create_genre")?;
        let mut state = self.state.lock().unwrap();
        let genre = Named::persisted(state.next_id(), normalize_genre_name(name));
        state.genres.push(genre.clone());
        Ok(genre)
    }
}

#[async_trait]
impl CastStore for MemoryStore {
    async fn casts_by_names(&self, names: &[String]) -> Result<Vec<Cast>, StoreError> {
        self.check("casts_by_names")?;
        self.cast_lookups.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .casts
            .iter()
            .filter(|c| names.contains(&c.name))
            .cloned()
            .collect())
    }

    async fn create_cast(&self, name: &str) -> Result<Cast, StoreError> {
        self.check("create_cast")?;
        let mut state = self.state.lock().unwrap();
        if let Some(found) = state.casts.iter().find(|c| c.name == name) {
            return Ok(found.clone());
        }
        let cast = Named::persisted(state.next_id(), name);
        state.casts.push(cast.clone());
        Ok(cast)
    }
}
