use crate::error::{AppError, AppResult};
use regex::Regex;

/// Validates an E.164 phone number (notification targets).
pub fn validate_phone(phone: &str) -> AppResult<()> {
    let phone_regex = Regex::new(r"^\+[1-9]\d{7,14}$").unwrap();

    if !phone_regex.is_match(phone) {
        return Err(AppError::ValidationError(
            "Phone number must be in E.164 format (+15551234567)".to_string(),
        ));
    }

    Ok(())
}

/// Strips separators and ensures a leading +.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        phone.to_string()
    } else {
        format!("+{}", digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+15551234567").is_ok());
        assert!(validate_phone("+821012345678").is_ok());
        assert!(validate_phone("15551234567").is_err());
        assert!(validate_phone("+0123").is_err());
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("+1 (555) 123-4567"), "+15551234567");
        assert_eq!(format_phone("821012345678"), "+821012345678");
    }
}
