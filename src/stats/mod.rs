//! # Stats Module
//!
//! Read-only aggregation over a user's journals and entries: counts plus
//! writing streaks. Streaks are always re-derived from entry timestamps,
//! never persisted, so they can't drift from the entry log.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;

#[cfg(test)]
mod tests;

pub use routes::stats_routes;
