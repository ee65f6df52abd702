//! Repository for the `directors` table.
//!
//! Directors are only written as part of a film write, so every method runs
//! on the caller's connection and joins its transaction.

use sqlx::PgConnection;

use crate::models::lookup::LookupRow;

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct DirectorRepo;

impl DirectorRepo {
    /// Find a director by exact name.
    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<LookupRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM directors WHERE name = $1");
        sqlx::query_as::<_, LookupRow>(&query)
            .bind(name)
            .fetch_optional(conn)
            .await
    }

    /// Create a director, or return the existing row if a concurrent writer
    /// inserted the same name first.
    pub async fn create_or_get(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<LookupRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO directors (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LookupRow>(&query)
            .bind(name)
            .fetch_one(conn)
            .await
    }

    /// Look the director up by name and create it only if absent.
    pub async fn find_or_create(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<LookupRow, sqlx::Error> {
        if let Some(existing) = Self::find_by_name(&mut *conn, name).await? {
            return Ok(existing);
        }
        let created = Self::create_or_get(conn, name).await?;
        tracing::debug!(director_id = created.id, "Director created");
        Ok(created)
    }
}
