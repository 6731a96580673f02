//! Centralized validation for registration and request payloads.

/// Maximum number of donors accepted in a single match invocation (DOS protection)
pub const MAX_DONOR_POOL: usize = 100_000;

/// Maximum number of open requests a directory holds
pub const MAX_OPEN_REQUESTS: usize = 100_000;

/// Field length limits for free-text input
pub const MIN_TEXT_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 120;
pub const MAX_LOCATION_LENGTH: usize = 120;
pub const MAX_HOSPITAL_LENGTH: usize = 160;
pub const MAX_NOTES_LENGTH: usize = 1000;

/// Digit bounds for phone-like contact strings
pub const MIN_CONTACT_DIGITS: usize = 6;
pub const MAX_CONTACT_DIGITS: usize = 20;

/// Payload validation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be at least {MIN_TEXT_LENGTH} characters")]
    TooShort { field: &'static str },
    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} contains control characters")]
    ControlCharacters { field: &'static str },
    #[error("invalid phone number: {0}")]
    InvalidContact(String),
    #[error(transparent)]
    BloodType(#[from] crate::core::types::ParseBloodTypeError),
    #[error(transparent)]
    Urgency(#[from] crate::core::types::ParseUrgencyError),
}

/// Validate a required free-text field and return it trimmed.
///
/// # Errors
///
/// Returns `ValidationError::TooShort` when fewer than two characters remain
/// after trimming, `ValidationError::TooLong` past `max`, and
/// `ValidationError::ControlCharacters` for embedded control characters.
pub fn validate_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.chars().count() < MIN_TEXT_LENGTH {
        return Err(ValidationError::TooShort { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacters { field });
    }

    Ok(trimmed.to_string())
}

/// Validate an optional free-text field. Blank values collapse to `None`.
///
/// # Errors
///
/// Returns `ValidationError::TooLong` or `ValidationError::ControlCharacters`.
pub fn validate_optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    // Newlines are allowed in notes
    if trimmed.chars().any(|c| c.is_control() && c != '\n') {
        return Err(ValidationError::ControlCharacters { field });
    }

    Ok(Some(trimmed.to_string()))
}

/// Validate a phone-like contact string.
///
/// Accepts digits, spaces, `+`, `-`, `(` and `)`, with a leading `+` only.
///
/// # Examples
///
/// ```
/// use donor_match::utils::validation::validate_contact;
///
/// assert!(validate_contact("01712345678").is_ok());
/// assert!(validate_contact("+880 (2) 5516-5001").is_ok());
/// assert!(validate_contact("call me").is_err());
/// ```
///
/// # Errors
///
/// Returns `ValidationError::InvalidContact` for anything else.
pub fn validate_contact(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let invalid = || ValidationError::InvalidContact(trimmed.to_string());

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '+');
    if trimmed.is_empty() || !trimmed.chars().all(allowed) {
        return Err(invalid());
    }
    if trimmed.rfind('+').is_some_and(|pos| pos > 0) {
        return Err(invalid());
    }

    let digits = trimmed.chars().filter(char::is_ascii_digit).count();
    if !(MIN_CONTACT_DIGITS..=MAX_CONTACT_DIGITS).contains(&digits) {
        return Err(invalid());
    }

    Ok(trimmed.to_string())
}

/// Check whether a donor pool is small enough to rank.
///
/// Returns an error message if the pool exceeds the limit, None if safe.
#[must_use]
pub fn check_pool_limit(count: usize) -> Option<String> {
    check_record_limit("donors", count, MAX_DONOR_POOL)
}

/// Check a record count of `kind` against `max`.
///
/// Returns an error message if the count exceeds the limit, None if safe.
#[must_use]
pub fn check_record_limit(kind: &str, count: usize, max: usize) -> Option<String> {
    if count > max {
        Some(format!("Too many {kind}: {count} exceeds maximum of {max}"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text_trims() {
        assert_eq!(validate_text("name", "  Karim  ", 10).unwrap(), "Karim");
    }

    #[test]
    fn test_validate_text_bounds() {
        assert_eq!(
            validate_text("location", " D ", 10),
            Err(ValidationError::TooShort { field: "location" })
        );
        assert_eq!(
            validate_text("name", "abcdefghijk", 10),
            Err(ValidationError::TooLong {
                field: "name",
                max: 10
            })
        );
        assert!(matches!(
            validate_text("name", "Ka\u{7}rim", 10),
            Err(ValidationError::ControlCharacters { .. })
        ));
    }

    #[test]
    fn test_validate_optional_text() {
        assert_eq!(validate_optional_text("notes", None, 10).unwrap(), None);
        assert_eq!(validate_optional_text("notes", Some("   "), 10).unwrap(), None);
        assert_eq!(
            validate_optional_text("notes", Some(" two\nlines "), 20).unwrap(),
            Some("two\nlines".to_string())
        );
        assert!(validate_optional_text("notes", Some("x".repeat(11).as_str()), 10).is_err());
    }

    #[test]
    fn test_validate_contact() {
        for ok in ["01712345678", "+880-2-55165001", "(02) 9661051", "10616 1"] {
            assert!(validate_contact(ok).is_ok(), "'{ok}' should be accepted");
        }
        for bad in ["", "abc", "12345", "0171+2345678", "0171234567890123456789", "017#1234567"] {
            assert!(validate_contact(bad).is_err(), "'{bad}' should be rejected");
        }
    }

    #[test]
    fn test_check_pool_limit() {
        assert!(check_pool_limit(10).is_none());
        assert!(check_pool_limit(MAX_DONOR_POOL).is_none());
        assert!(check_pool_limit(MAX_DONOR_POOL + 1).is_some());
    }

    #[test]
    fn test_check_record_limit() {
        assert!(check_record_limit("requests", 3, 3).is_none());
        assert_eq!(
            check_record_limit("requests", 4, 3).unwrap(),
            "Too many requests: 4 exceeds maximum of 3"
        );
    }
}
