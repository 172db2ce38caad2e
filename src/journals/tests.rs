//! Tests for the journals module: palette and field validation

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::Validator;
    use crate::journals::models::{CreateJournalRequest, UpdateJournalRequest};
    use chrono::{Datelike, Utc};

    fn create_request(title: &str, year: i64, color: Option<&str>) -> CreateJournalRequest {
        CreateJournalRequest {
            title: title.to_string(),
            year,
            color: color.map(|c| c.to_string()),
        }
    }

    #[test]
    fn test_valid_create_request() {
        let request = create_request("2024", 2024, Some("#2D8FB6"));
        let result = request.validate(&request);
        assert!(result.is_valid, "errors: {:?}", result.errors);
    }

    #[test]
    fn test_missing_color_is_valid() {
        // Color defaults server-side when omitted
        let request = create_request("Travel", 2024, None);
        let result = request.validate(&request);
        assert!(result.is_valid);
    }

    #[test]
    fn test_empty_title_rejected() {
        let request = create_request("   ", 2024, None);
        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "title"));
    }

    #[test]
    fn test_overlong_title_rejected() {
        let title = "a".repeat(31);
        let result = validators::validate_title(&title);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_year_bounds() {
        assert!(!validators::validate_year(1899).is_valid);
        assert!(validators::validate_year(1900).is_valid);

        let current_year = Utc::now().year() as i64;
        assert!(validators::validate_year(current_year).is_valid);
        assert!(!validators::validate_year(current_year + 1).is_valid);
    }

    #[test]
    fn test_color_must_be_in_palette() {
        assert!(validators::validate_color("#EA3232").is_valid);
        assert!(!validators::validate_color("#ffffff").is_valid);
        assert!(!validators::validate_color("red").is_valid);
    }

    #[test]
    fn test_default_color_is_in_palette() {
        assert!(validators::ALLOWED_COLORS.contains(&validators::DEFAULT_COLOR));
    }

    #[test]
    fn test_partial_update_validation() {
        let result = validators::validate_update(&UpdateJournalRequest {
            title: None,
            year: None,
            color: Some("#55A973".to_string()),
        });
        assert!(result.is_valid);

        let result = validators::validate_update(&UpdateJournalRequest {
            title: Some("".to_string()),
            year: Some(1800),
            color: Some("blue".to_string()),
        });
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 3);
    }
}
