use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, ValidationErrors, BLANK, REQUIRED};
use crate::models::user::{normalize_email, User};

const PASSWORD_MIN_LENGTH: usize = 5;

// Create / update user request
#[derive(Debug, Default, Deserialize)]
pub struct UserPayload {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Checked user fields; `None` means "leave unchanged".
#[derive(Debug, Default, PartialEq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UserPayload {
    /// With `partial` every field may be omitted, otherwise all are required.
    pub fn validate(self, partial: bool) -> Result<UserChanges, ApiError> {
        let mut errors = ValidationErrors::default();
        let required = !partial;

        let email = self.email.map(|e| normalize_email(&e));
        errors.check_name("email", email.as_deref(), required);
        if let Some(email) = email.as_deref() {
            if !email.trim().is_empty() && !is_valid_email(email) {
                errors.add("email", "Enter a valid email address.");
            }
        }

        errors.check_name("name", self.name.as_deref(), required);

        let password = self.password.map(|p| p.trim().to_string());
        match password.as_deref() {
            None if required => errors.add("password", REQUIRED),
            None => {}
            Some("") => errors.add("password", BLANK),
            Some(p) if p.chars().count() < PASSWORD_MIN_LENGTH => {
                errors.add("password", "Ensure this field has at least 5 characters.")
            }
            Some(p) => errors.check_length("password", p),
        }

        errors.into_result()?;
        Ok(UserChanges {
            email,
            name: self.name.map(|n| n.trim().to_string()),
            password,
        })
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !email.contains(char::is_whitespace)
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

// Token request and response
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}
