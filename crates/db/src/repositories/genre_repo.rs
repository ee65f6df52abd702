//! Repository for the `genres` table.

use sqlx::PgPool;

use crate::models::lookup::LookupRow;

const COLUMNS: &str = "id, name, created_at, updated_at";

/// Genres are a seeded, closed set; `create_or_get` exists for the open
/// taxonomy policy.
pub struct GenreRepo;

impl GenreRepo {
    /// Genres whose lower-cased name is in `names`. Callers pass lower-cased
    /// names.
    pub async fn find_by_names(
        pool: &PgPool,
        names: &[String],
    ) -> Result<Vec<LookupRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM genres WHERE LOWER(name) = ANY($1) ORDER BY name"
        );
        sqlx::query_as::<_, LookupRow>(&query)
            .bind(names)
            .fetch_all(pool)
            .await
    }

    /// Insert a genre under its lower-cased name, or return the existing one.
    pub async fn create_or_get(pool: &PgPool, name: &str) -> Result<LookupRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO genres (name) VALUES (LOWER($1)) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LookupRow>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }
}
