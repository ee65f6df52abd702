//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` struct per table or query shape and,
//! where rows are written, a create DTO.

pub mod film;
pub mod lookup;
pub mod user;
