//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument. Methods used inside the film
//! write transaction take `&mut PgConnection` instead.

pub mod cast_repo;
pub mod director_repo;
pub mod film_repo;
pub mod genre_repo;
pub mod user_repo;

pub use cast_repo::CastRepo;
pub use director_repo::DirectorRepo;
pub use film_repo::FilmRepo;
pub use genre_repo::GenreRepo;
pub use user_repo::UserRepo;
