use std::collections::HashMap;

use crate::error::ApiError;

/// Default password minimum length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// bcrypt only looks at the first 72 bytes
pub const MAX_PASSWORD_LENGTH: usize = 72;

pub const MAX_SUBMISSION_LENGTH: usize = 500;

/// Accumulates per-field problems so one response can report all of them
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(problem) = result {
            self.0.entry(field.to_string()).or_insert(problem);
        }
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid input", Some(self.0)))
        }
    }
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format".to_string());
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err("Invalid email format".to_string());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Email cannot contain whitespace".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(format!("Password must be at most {} bytes", MAX_PASSWORD_LENGTH));
    }
    Ok(())
}

pub fn validate_password_again(password: &str, password_again: &str) -> Result<(), String> {
    if password != password_again {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

pub fn validate_submission_body(body: &str) -> Result<(), String> {
    let body = body.trim();
    if body.is_empty() {
        return Err("Submission cannot be empty".to_string());
    }
    if body.chars().count() > MAX_SUBMISSION_LENGTH {
        return Err(format!("Submission must be at most {} characters", MAX_SUBMISSION_LENGTH));
    }
    Ok(())
}
