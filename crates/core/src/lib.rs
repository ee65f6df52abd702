//! Domain core for the film catalog.
//!
//! This crate performs no I/O. Storage is reached through the capability
//! traits in [`film::store`], implemented by `cinelog-db`.

pub mod error;
pub mod film;
pub mod query;
pub mod types;
pub mod validation;
