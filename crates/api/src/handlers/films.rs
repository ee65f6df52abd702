//! Handlers for the `/films` resource.
//!
//! Every endpoint requires authentication via [`AuthUser`]. The handlers only
//! validate input shape; duplicate titles, genre lookups, ownership and
//! persistence are the film catalog's business.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use cinelog_core::error::CoreError;
use cinelog_core::film::FilmDraft;
use cinelog_core::types::{FilmId, UserId};
use cinelog_core::validation::{find_item_out_of_bounds, parse_date};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::FilmListParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /films` and `PUT /films/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct FilmRequest {
    #[validate(length(min = 3, max = 100))]
    pub title: String,
    #[validate(length(min = 3, max = 40))]
    pub director: String,
    /// `YYYY-MM-DD`.
    pub release_date: String,
    #[validate(length(min = 10, max = 1000))]
    pub synopsis: String,
    #[validate(length(min = 1, max = 5))]
    pub genres: Vec<String>,
    #[serde(default)]
    pub casts: Vec<String>,
}

impl FilmRequest {
    /// Validate the body and turn it into a draft owned by `creator_id`.
    ///
    /// Genre names come out lower-cased.
    pub fn into_draft(self, creator_id: UserId) -> AppResult<FilmDraft> {
        self.validate()?;

        let release_date = parse_date(&self.release_date)
            .ok_or_else(|| CoreError::validation("release_date", "must be YYYY-MM-DD"))?;

        if let Some(bad) = find_item_out_of_bounds(&self.genres, 3, 100) {
            return Err(CoreError::validation(
                "genres",
                format!("genre '{bad}' must be between 3 and 100 characters"),
            )
            .into());
        }
        if find_item_out_of_bounds(&self.casts, 1, 100).is_some() {
            return Err(CoreError::validation(
                "casts",
                "cast names must be between 1 and 100 characters",
            )
            .into());
        }

        Ok(FilmDraft::new(
            creator_id,
            self.title,
            self.director,
            release_date,
            self.synopsis,
        )
        .with_genres(&self.genres)
        .with_casts(&self.casts))
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/films
///
/// Create a film owned by the caller.
pub async fn create_film(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<FilmRequest>,
) -> AppResult<impl IntoResponse> {
    let draft = input.into_draft(auth.user_id)?;
    let film = state.films.add_film(draft).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: film })))
}

/// GET /api/v1/films
///
/// One page of films, filtered and sorted per the query string.
pub async fn list_films(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FilmListParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.into_query()?;
    let page = state.films.view_all_films(query).await?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/films/{id}
pub async fn get_film(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(film_id): Path<FilmId>,
) -> AppResult<impl IntoResponse> {
    let film = state.films.view_film(film_id).await?;

    Ok(Json(DataResponse { data: film }))
}

/// PUT /api/v1/films/{id}
///
/// Replace a film's editable fields. Only its creator may do this.
pub async fn update_film(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(film_id): Path<FilmId>,
    Json(input): Json<FilmRequest>,
) -> AppResult<impl IntoResponse> {
    let draft = input.into_draft(auth.user_id)?;
    let film = state.films.update_film(film_id, draft).await?;

    Ok(Json(DataResponse { data: film }))
}

/// DELETE /api/v1/films/{id}
///
/// Only the film's creator may delete it.
pub async fn delete_film(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(film_id): Path<FilmId>,
) -> AppResult<impl IntoResponse> {
    state.films.delete_film(film_id, auth.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
