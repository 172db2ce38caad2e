//! Signup validation: username charset and profanity screening, email
//! shape, password policy. OAuth signups run their derived usernames
//! through the same rules as manual signups.

use regex::Regex;
use std::sync::OnceLock;

use super::models::SignupRequest;
use crate::common::ValidationResult;

const USERNAME_MAX_LEN: usize = 20;
const PASSWORD_MIN_LEN: usize = 8;
const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Words rejected anywhere inside a lowercased username.
const BLOCKED_USERNAME_WORDS: &[&str] = &[
    "fuck", "shit", "bitch", "cunt", "asshole", "bastard", "dick", "whore", "slut", "nigger",
    "faggot", "retard",
];

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$")
            .expect("email regex is valid")
    })
}

fn username_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Validate a full manual-signup payload
pub fn validate_signup(request: &SignupRequest) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(validate_username(&request.username));
    result.merge(validate_email(&request.email));
    result.merge(validate_password(&request.password));

    result
}

pub fn validate_username(username: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    if username.is_empty() {
        result.add_error("username", "Username is required");
        return result;
    }

    if username.len() > USERNAME_MAX_LEN {
        result.add_error("username", "Username must not exceed 20 characters");
    }

    if !username.chars().all(username_allowed_char) {
        result.add_error(
            "username",
            "Username may only contain letters, numbers, underscores and periods",
        );
    }

    let lowered = username.to_lowercase();
    if BLOCKED_USERNAME_WORDS.iter().any(|w| lowered.contains(w)) {
        result.add_error("username", "Username contains inappropriate content");
    }

    result
}

pub fn validate_email(email: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    if email.is_empty() {
        result.add_error("email", "Email is required");
    } else if !email_regex().is_match(email) {
        result.add_error("email", "Invalid email format");
    }

    result
}

pub fn validate_password(password: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    if password.len() < PASSWORD_MIN_LEN {
        result.add_error("password", "Password must be at least 8 characters long");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        result.add_error("password", "Password must contain at least one number");
    }

    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        result.add_error(
            "password",
            "Password must contain at least one special character",
        );
    }

    result
}

/// Reduce an arbitrary display name or email local-part to a valid
/// username candidate. Disallowed characters are stripped, the result is
/// truncated, and an all-invalid input falls back to a neutral default.
/// The caller still has to uniquify against existing accounts.
pub fn sanitize_username(raw: &str) -> String {
    let mut candidate: String = raw
        .chars()
        .filter(|c| username_allowed_char(*c))
        .take(USERNAME_MAX_LEN)
        .collect();

    let lowered = candidate.to_lowercase();
    if candidate.is_empty() || BLOCKED_USERNAME_WORDS.iter().any(|w| lowered.contains(w)) {
        candidate = "writer".to_string();
    }

    candidate
}
