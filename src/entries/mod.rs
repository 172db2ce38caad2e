//! # Entries Module
//!
//! CRUD over journal entries and their mood associations. Every query
//! reaches entries through the owning journal, so ownership is enforced
//! by the join itself.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::entries_routes;
