pub mod auth;
pub mod films;
