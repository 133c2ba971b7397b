use std::collections::BTreeMap;

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

/// Field name to the list of messages reported for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const TOO_LONG: &str = "Ensure this field has no more than 255 characters.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found.")]
    NotFound,

    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("{0}")]
    AuthenticationFailed(&'static str),

    #[error("Invalid input: {0:?}")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = ValidationErrors::default();
        errors.add(field, message);
        ApiError::Validation(errors.0)
    }

    /// Reports a unique-constraint failure as `message` on `field`; other
    /// database errors pass through.
    pub fn conflict(err: sqlx::Error, field: &str, message: &str) -> Self {
        if crate::db::is_unique_violation(&err) {
            ApiError::field(field, message)
        } else {
            ApiError::Database(err)
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::NotAuthenticated | ApiError::AuthenticationFailed(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) | ApiError::Hash(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => HttpResponse::BadRequest().json(errors),
            ApiError::NotAuthenticated | ApiError::AuthenticationFailed(_) => {
                HttpResponse::Unauthorized()
                    .insert_header((header::WWW_AUTHENTICATE, "Token"))
                    .json(json!({ "detail": self.to_string() }))
            }
            ApiError::Database(_) | ApiError::Hash(_) | ApiError::Internal(_) => {
                error!("{}", self);
                HttpResponse::InternalServerError()
                    .json(json!({ "detail": "A server error occurred." }))
            }
            _ => HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() })),
        }
    }
}

/// Collects per-field messages while a request body is checked.
#[derive(Debug, Default)]
pub struct ValidationErrors(FieldErrors);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.0))
        }
    }

    /// Name-like field: not blank and at most 255 characters.
    pub fn check_name(&mut self, field: &str, value: Option<&str>, required: bool) {
        match value {
            None if required => self.add(field, REQUIRED),
            None => {}
            Some(v) => {
                if v.trim().is_empty() {
                    self.add(field, BLANK);
                } else {
                    self.check_length(field, v);
                }
            }
        }
    }

    pub fn check_length(&mut self, field: &str, value: &str) {
        self.check_max_length(field, value, 255);
    }

    pub fn check_max_length(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, &format!("Ensure this field has no more than {} characters.", max));
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}
