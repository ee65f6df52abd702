//! Rows of the name-keyed lookup tables: `directors`, `genres`, `casts`.

use sqlx::FromRow;
use cinelog_core::film::Named;
use cinelog_core::types::{DbId, Timestamp};

/// A row from `directors`, `genres` or `casts`; the three share one shape.
#[derive(Debug, Clone, FromRow)]
pub struct LookupRow {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<LookupRow> for Named {
    fn from(row: LookupRow) -> Self {
        Named::persisted(row.id, row.name)
    }
}
