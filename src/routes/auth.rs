use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use log::info;
use sqlx::AnyPool;

use crate::errors::ApiError;
use crate::models::token::AuthToken;
use crate::models::user::User;

const KEYWORD: &str = "token";

/// The user behind a valid `Authorization: Token <key>` header.
/// Handlers taking this extractor answer 401 to anonymous requests.
pub struct AuthenticatedUser(pub User);

impl Deref for AuthenticatedUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

/// Pulls the key out of an `Authorization` header value. `Ok(None)` means the
/// header uses some other scheme and the request counts as anonymous.
pub fn parse_token_header(value: &str) -> Result<Option<&str>, ApiError> {
    let mut parts = value.split_whitespace();
    match parts.next() {
        Some(keyword) if keyword.eq_ignore_ascii_case(KEYWORD) => {}
        _ => return Ok(None),
    }

    let key = parts.next().ok_or(ApiError::AuthenticationFailed(
        "Invalid token header. No credentials provided.",
    ))?;
    if parts.next().is_some() {
        return Err(ApiError::AuthenticationFailed(
            "Invalid token header. Token string should not contain spaces.",
        ));
    }
    Ok(Some(key))
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<AnyPool>>().cloned();
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let header = header.ok_or(ApiError::NotAuthenticated)?;
            let key = parse_token_header(&header)?.ok_or(ApiError::NotAuthenticated)?;
            let pool = pool.ok_or_else(|| ApiError::Internal("database pool is not configured".into()))?;

            match AuthToken::find_user(pool.get_ref(), key).await? {
                Some(user) => Ok(AuthenticatedUser(user)),
                None => {
                    info!("Rejected unknown token");
                    Err(ApiError::AuthenticationFailed("Invalid token."))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_scheme() {
        assert_eq!(parse_token_header("Token abc123").unwrap(), Some("abc123"));
        assert_eq!(parse_token_header("token abc123").unwrap(), Some("abc123"));
        assert_eq!(parse_token_header("Bearer abc123").unwrap(), None);
        assert_eq!(parse_token_header("").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_token_headers() {
        assert!(matches!(
            parse_token_header("Token"),
            Err(ApiError::AuthenticationFailed(msg)) if msg.contains("No credentials")
        ));
        assert!(matches!(
            parse_token_header("Token a b"),
            Err(ApiError::AuthenticationFailed(msg)) if msg.contains("spaces")
        ));
    }
}
