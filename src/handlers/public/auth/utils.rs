use serde::{Deserialize, Deserializer};

use crate::database::UniqueField;
use crate::error::ApiError;

/// Deserialize a string with surrounding whitespace removed, so `" al"` and
/// `"al"` name the same account
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Reject a required string field that is empty or whitespace
pub fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{} is required", field)));
    }
    Ok(())
}

/// Optional text column: empty strings are stored as NULL
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate email format
///
/// Basic shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email_format(email: &str) -> Result<(), ApiError> {
    let invalid = || ApiError::bad_request("Invalid email format");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

/// Validate phone number format
///
/// Digits plus common separators; at least one digit.
pub fn validate_phone_format(phone_number: &str) -> Result<(), ApiError> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')');

    if !phone_number.chars().all(allowed) || !phone_number.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::bad_request("Invalid phone number format"));
    }
    Ok(())
}

/// Field-qualified conflict for the registration flows
pub fn registration_conflict(field: UniqueField) -> ApiError {
    let message = match field {
        UniqueField::Email => "Email is already in use.",
        UniqueField::Username => "Username is already taken.",
        UniqueField::PhoneNumber => "Phone number is already registered.",
        UniqueField::SsoIdentity => "SSO account is already registered.",
        UniqueField::Unknown => "Failed to register user. One of the entered fields already exists.",
    };
    ApiError::conflict(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Named {
        #[serde(deserialize_with = "trimmed")]
        username: String,
    }

    #[test]
    fn trimmed_strips_surrounding_whitespace() {
        let named: Named = serde_json::from_str(r#"{ "username": "  al \t" }"#).unwrap();
        assert_eq!(named.username, "al");

        let inner: Named = serde_json::from_str(r#"{ "username": "a l" }"#).unwrap();
        assert_eq!(inner.username, "a l");
    }

    #[test]
    fn require_rejects_blank() {
        assert!(require("username", "al").is_ok());
        assert_eq!(
            require("username", "  ").unwrap_err(),
            ApiError::bad_request("username is required")
        );
    }

    #[test]
    fn email_format() {
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("first.last@mail.example.org").is_ok());

        for bad in ["", "ax.com", "@x.com", "a@", "a@x", "a@x.", "a@@x.com", "a b@x.com"] {
            assert!(validate_email_format(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn phone_format() {
        assert!(validate_phone_format("1").is_ok());
        assert!(validate_phone_format("+1 (555) 010-9999").is_ok());
        assert!(validate_phone_format("555abc").is_err());
        assert!(validate_phone_format("+-").is_err());
    }

    #[test]
    fn empty_optionals_become_none() {
        assert_eq!(non_empty(Some("".into())), None);
        assert_eq!(non_empty(Some("1990-01-01".into())), Some("1990-01-01".into()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn conflicts_name_the_field() {
        assert_eq!(
            registration_conflict(UniqueField::Email),
            ApiError::conflict("Email is already in use.")
        );
        assert_eq!(registration_conflict(UniqueField::Unknown).status_code(), 409);
    }
}
