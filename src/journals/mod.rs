//! # Journals Module
//!
//! CRUD over a user's journals. Ownership checks are folded into every
//! query - another user's journal is indistinguishable from a missing one.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::journals_routes;
