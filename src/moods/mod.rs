//! # Moods Module
//!
//! Read-only reference data: the fixed emoji/score set entries can be
//! tagged with. Seeding happens at startup in `common::migrations`.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::moods_routes;
