//! Route definitions for the `/films` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::films;
use crate::state::AppState;

/// Routes mounted at `/films`.
///
/// ```text
/// GET    /       -> list_films
/// POST   /       -> create_film
/// GET    /{id}   -> get_film
/// PUT    /{id}   -> update_film
/// DELETE /{id}   -> delete_film
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(films::list_films).post(films::create_film))
        .route(
            "/{id}",
            get(films::get_film)
                .put(films::update_film)
                .delete(films::delete_film),
        )
}
