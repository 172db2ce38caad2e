//! # Prompts Module
//!
//! AI writing-prompt endpoints. The generation service degrades to a
//! local prompt list on any failure, so these handlers never hard-fail.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::prompts_routes;
