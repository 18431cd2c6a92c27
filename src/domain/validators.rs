//! Field Validators
//!
//! Pure functions checking individual field constraints. No I/O, no clock:
//! anything time-dependent takes the reference year as an argument.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ValidationError;

/// Minimum password length accepted by the backend
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Earliest accepted year of onset for a medical condition
pub const MIN_ONSET_YEAR: i32 = 1900;

/// Minimum characters before a referral identifier is worth looking up
pub const MIN_REFERRAL_LENGTH: usize = 3;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static GREEK_MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^69\d{8}$").expect("mobile pattern is valid"));

/// Reject empty or whitespace-only values
pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Check that an email address is well-formed
pub fn email(value: &str) -> Result<(), ValidationError> {
    required("email", value)?;
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(ValidationError::invalid_format(
            "email",
            "expected an address like name@example.com",
        ));
    }
    Ok(())
}

/// Check password length and confirmation equality
pub fn password_pair(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    required("password", password)?;
    required("password_confirmation", confirmation)?;

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password",
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if password != confirmation {
        return Err(ValidationError::Mismatch {
            field: "password_confirmation",
            other: "password",
        });
    }

    Ok(())
}

/// Check a year-of-onset entry: exactly four digits, within
/// `MIN_ONSET_YEAR..=current_year`.
pub fn year_of_onset(value: &str, current_year: i32) -> Result<i32, ValidationError> {
    let trimmed = value.trim();

    if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "year_of_onset",
            format!("'{}' is not a four-digit year", trimmed),
        ));
    }

    // Four ASCII digits always parse
    let year: i32 = trimmed
        .parse()
        .map_err(|_| ValidationError::invalid_format("year_of_onset", "not a number"))?;

    if year < MIN_ONSET_YEAR || year > current_year {
        return Err(ValidationError::OutOfRange {
            field: "year_of_onset",
            value: trimmed.to_string(),
            min: MIN_ONSET_YEAR as i64,
            max: current_year as i64,
        });
    }

    Ok(year)
}

/// Strip spaces, dashes and parentheses from a phone number
pub fn normalize_phone(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

/// Check whether a (normalized) identifier is a Greek mobile number
pub fn is_mobile_number(value: &str) -> bool {
    GREEK_MOBILE_RE.is_match(&normalize_phone(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        assert!(required("first_name", "Maria").is_ok());
        assert_eq!(
            required("first_name", "   "),
            Err(ValidationError::MissingField("first_name"))
        );
    }

    #[test]
    fn test_email_format() {
        assert!(email("maria@example.com").is_ok());
        assert!(matches!(
            email("maria.example.com"),
            Err(ValidationError::InvalidFormat { field: "email", .. })
        ));
        assert!(matches!(
            email("maria@example"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert_eq!(email(""), Err(ValidationError::MissingField("email")));
    }

    #[test]
    fn test_password_too_short() {
        assert_eq!(
            password_pair("abc12", "abc12"),
            Err(ValidationError::TooShort {
                field: "password",
                min: 6
            })
        );
    }

    #[test]
    fn test_password_mismatch() {
        assert!(matches!(
            password_pair("secret1", "secret2"),
            Err(ValidationError::Mismatch { .. })
        ));
        assert!(password_pair("secret1", "secret1").is_ok());
    }

    #[test]
    fn test_year_of_onset_bounds() {
        assert_eq!(year_of_onset("2020", 2026), Ok(2020));
        assert_eq!(year_of_onset("1900", 2026), Ok(1900));
        assert_eq!(year_of_onset("2026", 2026), Ok(2026));
        assert!(matches!(
            year_of_onset("1899", 2026),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            year_of_onset("2099", 2026),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            year_of_onset("abcd", 2026),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            year_of_onset("202", 2026),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(normalize_phone("691 234-5678"), "6912345678");
        assert_eq!(normalize_phone("(691) 2345678"), "6912345678");
        assert!(is_mobile_number("691 234 5678"));
        assert!(!is_mobile_number("2101234567"));
        assert!(!is_mobile_number("69123"));
    }
}
