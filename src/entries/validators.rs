use super::models::{CreateEntryRequest, UpdateEntryRequest};
use crate::common::ValidationResult;

pub fn validate_title(title: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    if title.trim().is_empty() {
        result.add_error("title", "Title cannot be empty");
    }

    result
}

pub fn validate_create(request: &CreateEntryRequest) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(validate_title(&request.title));
    if request.journal_id.trim().is_empty() {
        result.add_error("journal_id", "Journal id is required");
    }

    result
}

pub fn validate_update(request: &UpdateEntryRequest) -> ValidationResult {
    let mut result = ValidationResult::new();

    if let Some(title) = &request.title {
        result.merge(validate_title(title));
    }

    result
}
