//! # Auth Module
//!
//! Handles the whole session/credential lifecycle:
//! - password signup and login
//! - the Google OAuth handshake (state, code exchange, user upsert)
//! - session token issuance, refresh and revocation (cookie transport)
//! - the AuthedUser extractor with the CSRF double-submit check

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod routes;
pub mod tokens;
pub mod validators;


pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
