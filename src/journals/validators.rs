use chrono::{Datelike, Utc};

use super::models::{CreateJournalRequest, UpdateJournalRequest};
use crate::common::{ValidationResult, Validator};

const TITLE_MAX_LEN: usize = 30;
const YEAR_MIN: i64 = 1900;

/// The fixed palette journal covers can use.
pub const ALLOWED_COLORS: &[&str] = &[
    "#EA3232", // red
    "#F19748", // orange
    "#EAD04B", // yellow
    "#55A973", // green
    "#2D8FB6", // blue
    "#6A54B4", // purple
    "#FF8E9F", // pink
    "#151414", // black
    "#E7E5E5", // default gray
];

pub const DEFAULT_COLOR: &str = "#E7E5E5";

pub fn validate_title(title: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    if title.trim().is_empty() {
        result.add_error("title", "Journal title cannot be empty");
    }
    if title.trim().len() > TITLE_MAX_LEN {
        result.add_error("title", "Journal title should not exceed 30 characters");
    }

    result
}

pub fn validate_year(year: i64) -> ValidationResult {
    let mut result = ValidationResult::new();

    let current_year = Utc::now().year() as i64;
    if year < YEAR_MIN || year > current_year {
        result.add_error("year", "Year must be between 1900 and the current year");
    }

    result
}

pub fn validate_color(color: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !ALLOWED_COLORS.contains(&color) {
        result.add_error("color", "Color must be one of the journal palette colors");
    }

    result
}

impl Validator<CreateJournalRequest> for CreateJournalRequest {
    fn validate(&self, data: &CreateJournalRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.merge(validate_title(&data.title));
        result.merge(validate_year(data.year));
        if let Some(color) = &data.color {
            result.merge(validate_color(color));
        }

        result
    }
}

pub fn validate_update(request: &UpdateJournalRequest) -> ValidationResult {
    let mut result = ValidationResult::new();

    if let Some(title) = &request.title {
        result.merge(validate_title(title));
    }
    if let Some(year) = request.year {
        result.merge(validate_year(year));
    }
    if let Some(color) = &request.color {
        result.merge(validate_color(color));
    }

    result
}
