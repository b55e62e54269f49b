//! Field-level validation shared by handlers and the CSV importer.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum digits in a phone number (without country prefix formatting).
pub const MIN_PHONE_DIGITS: usize = 7;
/// Maximum digits in a phone number (E.164 limit).
pub const MAX_PHONE_DIGITS: usize = 15;

/// Maximum length for names of clients, bots, campaigns, templates, plans.
pub const MAX_NAME_LENGTH: usize = 200;
/// Maximum length for free-text descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 2_000;

/// Strip formatting characters from a phone number, keeping a leading `+`.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let (prefix, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };
    let body: String = rest
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    format!("{prefix}{body}")
}

/// Validate a phone number and return its normalized form.
pub fn validate_phone(raw: &str) -> Result<String, CoreError> {
    let normalized = normalize_phone(raw);
    let digits = normalized.strip_prefix('+').unwrap_or(&normalized);

    if digits.is_empty() {
        return Err(CoreError::Validation(
            "Phone number must not be empty".to_string(),
        ));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Phone number '{raw}' may only contain digits and a leading +"
        )));
    }
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(CoreError::Validation(format!(
            "Phone number must have between {MIN_PHONE_DIGITS} and {MAX_PHONE_DIGITS} digits (got {})",
            digits.len()
        )));
    }
    Ok(normalized)
}

/// Validate an email address and return it trimmed and lowercased.
pub fn validate_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim().to_lowercase();
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{raw}' is not a valid email address"
        )));
    }
    Ok(email)
}

/// Validate a required text field: non-blank after trimming and at most
/// `max_len` characters.
pub fn validate_required_text(field: &str, value: &str, max_len: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max_len} characters (got {len})"
        )));
    }
    Ok(())
}

/// Validate an optional text field's length.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Result<(), CoreError> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max_len} characters"
        ))),
        _ => Ok(()),
    }
}

/// Validate a `#RRGGBB` color.
pub fn validate_hex_color(value: &str) -> Result<(), CoreError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(CoreError::Validation(format!(
            "Color '{value}' must be in #RRGGBB format"
        )));
    }
    Ok(())
}

/// Validate an absolute http(s) URL.
pub fn validate_url(field: &str, value: &str) -> Result<(), CoreError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "{field} must be an http:// or https:// URL"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- phone --

    #[test]
    fn normalize_strips_formatting() {
        assert_eq!(normalize_phone(" +91 (98) 765-43.210 "), "+919876543210");
        assert_eq!(normalize_phone("555 0100"), "5550100");
    }

    #[test]
    fn valid_phones_pass() {
        assert_eq!(validate_phone("+1 415 555 0100").unwrap(), "+14155550100");
        assert_eq!(validate_phone("9876543").unwrap(), "9876543");
    }

    #[test]
    fn letters_rejected() {
        let err = validate_phone("+1 415 CALL NOW").unwrap_err();
        assert!(err.to_string().contains("only contain digits"));
    }

    #[test]
    fn too_short_and_too_long_rejected() {
        assert!(validate_phone("123456").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
        assert!(validate_phone("+123456789012345").is_ok());
    }

    #[test]
    fn empty_phone_rejected() {
        let err = validate_phone("  ").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    // -- email --

    #[test]
    fn email_normalized() {
        assert_eq!(validate_email(" Ops@Example.COM ").unwrap(), "ops@example.com");
    }

    #[test]
    fn invalid_email_rejected() {
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@").is_err());
    }

    // -- text --

    #[test]
    fn required_text_rules() {
        assert!(validate_required_text("Name", "Spring sale", 20).is_ok());
        let err = validate_required_text("Name", "   ", 20).unwrap_err();
        assert!(err.to_string().contains("Name must not be empty"));
        let err = validate_required_text("Name", &"x".repeat(21), 20).unwrap_err();
        assert!(err.to_string().contains("maximum length of 20"));
    }

    #[test]
    fn optional_text_rules() {
        assert!(validate_optional_text("Description", None, 5).is_ok());
        assert!(validate_optional_text("Description", Some("abcde"), 5).is_ok());
        assert!(validate_optional_text("Description", Some("abcdef"), 5).is_err());
    }

    // -- color / url --

    #[test]
    fn hex_color_rules() {
        assert!(validate_hex_color("#1A2b3C").is_ok());
        assert!(validate_hex_color("1A2B3C").is_err());
        assert!(validate_hex_color("#12345G").is_err());
        assert!(validate_hex_color("#123").is_err());
    }

    #[test]
    fn url_rules() {
        assert!(validate_url("Webhook URL", "https://hooks.example.com/rcs").is_ok());
        assert!(validate_url("Webhook URL", "http://localhost:8080").is_ok());
        assert!(validate_url("Webhook URL", "ftp://example.com").is_err());
        assert!(validate_url("Webhook URL", "https://").is_err());
    }
}
