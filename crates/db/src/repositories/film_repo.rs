//! Repository for the `films` table and its `film_genres` / `film_casts`
//! join tables.
//!
//! List queries are assembled with [`QueryBuilder`] from typed
//! [`FilmPredicate`]s; every user-supplied value is bound, and sort columns
//! come from a fixed mapping.

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use cinelog_core::query::filter::contains_pattern;
use cinelog_core::query::{FilmPredicate, SortDirection, SortOption};
use cinelog_core::types::{DbId, FilmId};

use crate::models::film::{CreateFilm, FilmLink, FilmRecord, FilmRow, UpdateFilm};

/// Columns of the bare `films` row.
const RECORD_COLUMNS: &str = "\
    id, creator_id, director_id, title, release_date, synopsis, created_at, updated_at";

/// Columns of a film joined with its director (`f`, `d`).
const ROW_COLUMNS: &str = "\
    f.id, f.creator_id, f.director_id, d.name AS director_name, f.title, \
    f.release_date, f.synopsis, f.created_at, f.updated_at";

const ROW_FROM: &str = "FROM films f JOIN directors d ON d.id = f.director_id";

/// Map a validated sort field onto its column.
fn sort_column(field: &str) -> &'static str {
    match field {
        "title" => "f.title",
        _ => "f.release_date",
    }
}

/// Append ` WHERE ... AND ...` for `predicates`, if any.
fn push_predicates(qb: &mut QueryBuilder<'_, Postgres>, predicates: &[FilmPredicate]) {
    for (i, predicate) in predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            FilmPredicate::TitleContains(needle) => {
                qb.push("f.title LIKE ");
                qb.push_bind(contains_pattern(needle));
                qb.push(" ESCAPE '\\'");
            }
            FilmPredicate::ReleasedOn(date) => {
                qb.push("f.release_date = ");
                qb.push_bind(*date);
            }
            FilmPredicate::ReleasedBetween(from, to) => {
                qb.push("f.release_date BETWEEN ");
                qb.push_bind(*from);
                qb.push(" AND ");
                qb.push_bind(*to);
            }
            FilmPredicate::GenreIds(ids) => {
                qb.push(
                    "EXISTS (SELECT 1 FROM film_genres fg \
                     WHERE fg.film_id = f.id AND fg.genre_id = ANY(",
                );
                qb.push_bind(ids.clone());
                qb.push("))");
            }
            FilmPredicate::GenreNames(names) => {
                qb.push(
                    "EXISTS (SELECT 1 FROM film_genres fg \
                     JOIN genres g ON g.id = fg.genre_id \
                     WHERE fg.film_id = f.id AND LOWER(g.name) = ANY(",
                );
                qb.push_bind(names.clone());
                qb.push("))");
            }
        }
    }
}

/// Provides film reads, writes and association maintenance.
pub struct FilmRepo;

impl FilmRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Count films titled exactly `title` (case-sensitive), ignoring
    /// `excluding`.
    pub async fn count_by_title(
        pool: &PgPool,
        title: &str,
        excluding: Option<FilmId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM films \
             WHERE title = $1 AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(title)
        .bind(excluding)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: FilmId) -> Result<Option<FilmRow>, sqlx::Error> {
        let query = format!("SELECT {ROW_COLUMNS} {ROW_FROM} WHERE f.id = $1");
        sqlx::query_as::<_, FilmRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Like [`find_by_id`](Self::find_by_id), also loading the creator's
    /// username.
    pub async fn find_for_view(pool: &PgPool, id: FilmId) -> Result<Option<FilmRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ROW_COLUMNS}, u.username AS creator_username {ROW_FROM} \
             JOIN users u ON u.id = f.creator_id \
             WHERE f.id = $1"
        );
        sqlx::query_as::<_, FilmRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of films matching every predicate.
    ///
    /// Without a sort, newest release first. Ties are broken by id so pages
    /// are stable.
    pub async fn list(
        pool: &PgPool,
        predicates: &[FilmPredicate],
        sort: Option<&SortOption>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FilmRow>, sqlx::Error> {
        let (column, direction) = match sort {
            Some(s) => (sort_column(s.field()), s.direction()),
            None => ("f.release_date", SortDirection::Desc),
        };

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {ROW_COLUMNS} {ROW_FROM}"));
        push_predicates(&mut qb, predicates);
        qb.push(" ORDER BY ");
        qb.push(column);
        qb.push(" ");
        qb.push(direction.as_sql());
        qb.push(", f.id ");
        qb.push(direction.as_sql());
        qb.push(" LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset.max(0));

        qb.build_query_as::<FilmRow>().fetch_all(pool).await
    }

    /// Count films matching every predicate.
    pub async fn count(pool: &PgPool, predicates: &[FilmPredicate]) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM films f");
        push_predicates(&mut qb, predicates);
        qb.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// Genres linked to any of `film_ids`.
    pub async fn genres_for(
        pool: &PgPool,
        film_ids: &[FilmId],
    ) -> Result<Vec<FilmLink>, sqlx::Error> {
        sqlx::query_as::<_, FilmLink>(
            "SELECT fg.film_id, g.id, g.name \
             FROM film_genres fg JOIN genres g ON g.id = fg.genre_id \
             WHERE fg.film_id = ANY($1) \
             ORDER BY g.name",
        )
        .bind(film_ids)
        .fetch_all(pool)
        .await
    }

    /// Casts linked to any of `film_ids`.
    pub async fn casts_for(
        pool: &PgPool,
        film_ids: &[FilmId],
    ) -> Result<Vec<FilmLink>, sqlx::Error> {
        sqlx::query_as::<_, FilmLink>(
            "SELECT fc.film_id, c.id, c.name \
             FROM film_casts fc JOIN casts c ON c.id = fc.cast_id \
             WHERE fc.film_id = ANY($1) \
             ORDER BY c.name",
        )
        .bind(film_ids)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Writes (run inside the caller's transaction)
    // -----------------------------------------------------------------------

    /// Insert a film row. Fails with `uq_films_title` on a duplicate title.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &CreateFilm,
    ) -> Result<FilmRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO films (creator_id, director_id, title, release_date, synopsis) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {RECORD_COLUMNS}"
        );
        sqlx::query_as::<_, FilmRecord>(&query)
            .bind(input.creator_id)
            .bind(input.director_id)
            .bind(&input.title)
            .bind(input.release_date)
            .bind(&input.synopsis)
            .fetch_one(conn)
            .await
    }

    /// Overwrite a film's mutable columns. The creator is never changed.
    ///
    /// Returns `None` if no film with `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: FilmId,
        input: &UpdateFilm,
    ) -> Result<Option<FilmRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE films SET \
                 director_id = $2, \
                 title = $3, \
                 release_date = $4, \
                 synopsis = $5 \
             WHERE id = $1 \
             RETURNING {RECORD_COLUMNS}"
        );
        sqlx::query_as::<_, FilmRecord>(&query)
            .bind(id)
            .bind(input.director_id)
            .bind(&input.title)
            .bind(input.release_date)
            .bind(&input.synopsis)
            .fetch_optional(conn)
            .await
    }

    /// Replace the film's genre links with exactly `genre_ids`.
    pub async fn replace_genres(
        conn: &mut PgConnection,
        film_id: FilmId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM film_genres WHERE film_id = $1")
            .bind(film_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            "INSERT INTO film_genres (film_id, genre_id) \
             SELECT $1, UNNEST($2::bigint[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(film_id)
        .bind(genre_ids)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Replace the film's cast links with exactly `cast_ids`.
    pub async fn replace_casts(
        conn: &mut PgConnection,
        film_id: FilmId,
        cast_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM film_casts WHERE film_id = $1")
            .bind(film_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            "INSERT INTO film_casts (film_id, cast_id) \
             SELECT $1, UNNEST($2::bigint[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(film_id)
        .bind(cast_ids)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Delete a film. Join rows go with it; directors, genres and casts stay.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: FilmId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM films WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
