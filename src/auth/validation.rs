use lazy_static::lazy_static;
use regex::Regex;

use super::{
    dto::{LoginRequest, RegisterRequest},
    errors::AuthError,
};

const MAX_FIELD_LEN: usize = 255;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    email.len() <= MAX_FIELD_LEN && EMAIL_RE.is_match(email)
}

pub(crate) fn validate_register(req: &RegisterRequest, min_password_len: usize) -> Result<(), AuthError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AuthError::Validation("Name is required".into()));
    }
    if name.chars().count() > MAX_FIELD_LEN {
        return Err(AuthError::Validation("Name is too long".into()));
    }
    if !is_valid_email(&req.email) {
        return Err(AuthError::Validation("Invalid email".into()));
    }
    if req.password.chars().count() < min_password_len {
        return Err(AuthError::Validation(format!(
            "Password must be at least {min_password_len} characters"
        )));
    }
    Ok(())
}

/// Shape only. No strength rule at login.
pub(crate) fn validate_login(req: &LoginRequest) -> Result<(), AuthError> {
    if !is_valid_email(&req.email) {
        return Err(AuthError::Validation("Invalid email".into()));
    }
    if req.password.is_empty() {
        return Err(AuthError::Validation("Password is required".into()));
    }
    Ok(())
}
