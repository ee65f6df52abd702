//! Repository for the `casts` table.

use sqlx::PgPool;

use crate::models::lookup::LookupRow;

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct CastRepo;

impl CastRepo {
    /// Casts whose name exactly matches one of `names`.
    pub async fn find_by_names(
        pool: &PgPool,
        names: &[String],
    ) -> Result<Vec<LookupRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM casts WHERE name = ANY($1) ORDER BY name");
        sqlx::query_as::<_, LookupRow>(&query)
            .bind(names)
            .fetch_all(pool)
            .await
    }

    /// Create a cast or return the existing row with that name.
    ///
    /// Uses `ON CONFLICT` so that two films naming the same new actor at once
    /// both resolve to one row.
    pub async fn create_or_get(pool: &PgPool, name: &str) -> Result<LookupRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO casts (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LookupRow>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }
}
