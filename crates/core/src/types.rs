/// Surrogate keys of lookup-style tables (genres, casts, directors) are BIGSERIAL.
pub type DbId = i64;

/// Films and users are identified by opaque UUIDs.
pub type FilmId = uuid::Uuid;

/// See [`FilmId`].
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
