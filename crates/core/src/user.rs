//! Account field validation.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Maximum length of an email address.
pub const MAX_EMAIL_LEN: usize = 255;

/// Maximum length of a user's full name.
pub const MAX_FULL_NAME_LEN: usize = 100;

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.len() > MAX_EMAIL_LEN {
        return Err(CoreError::Validation(format!(
            "Email must not exceed {MAX_EMAIL_LEN} characters"
        )));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

pub fn validate_full_name(full_name: Option<&str>) -> Result<(), CoreError> {
    match full_name {
        Some(name) if name.chars().count() > MAX_FULL_NAME_LEN => Err(CoreError::Validation(
            format!("Full name must not exceed {MAX_FULL_NAME_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_regular_addresses() {
        assert!(validate_email("demo-1700000000@robofleet.dev").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn full_name_is_optional_but_bounded() {
        assert!(validate_full_name(None).is_ok());
        assert!(validate_full_name(Some("Demo Operator")).is_ok());
        assert!(validate_full_name(Some(&"n".repeat(MAX_FULL_NAME_LEN + 1))).is_err());
    }
}
