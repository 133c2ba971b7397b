use actix_web::{web, HttpResponse};
use bcrypt::{hash, verify};
use log::info;
use sqlx::AnyPool;

use super::user_models::{TokenRequest, TokenResponse, UserChanges, UserPayload, UserResponse};
use crate::config::Config;
use crate::errors::{ApiError, ValidationErrors};
use crate::models::token::AuthToken;
use crate::models::user::{normalize_email, User};
use crate::routes::auth::AuthenticatedUser;

const DUPLICATE_EMAIL: &str = "user with this email already exists.";
const BAD_CREDENTIALS: &str = "Unable to authenticate with provided credentials.";

// register a new user
pub async fn create_user(
    pool: web::Data<AnyPool>,
    config: web::Data<Config>,
    req: web::Json<UserPayload>,
) -> Result<HttpResponse, ApiError> {
    let changes = req.into_inner().validate(false)?;
    let (Some(email), Some(name), Some(password)) = (changes.email, changes.name, changes.password) else {
        return Err(ApiError::Internal("validated user payload is incomplete".into()));
    };
    info!("Received request to register user: {}", email);

    if User::find_by_email(pool.get_ref(), &email).await?.is_some() {
        info!("Email {} is already registered", email);
        return Err(ApiError::field("email", DUPLICATE_EMAIL));
    }

    let password_hash = hash(&password, config.bcrypt_cost)?;
    let mut conn = pool.acquire().await?;
    let user = User::create(&mut conn, &email, &name, &password_hash)
        .await
        .map_err(|e| ApiError::conflict(e, "email", DUPLICATE_EMAIL))?;

    info!("User {} registered successfully", user.email);
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

// exchange email + password for the user's API token
pub async fn create_token(
    pool: web::Data<AnyPool>,
    req: web::Json<TokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    let mut errors = ValidationErrors::default();
    errors.check_name("email", req.email.as_deref(), true);
    match req.password.as_deref() {
        None => errors.add("password", crate::errors::REQUIRED),
        Some("") => errors.add("password", crate::errors::BLANK),
        Some(_) => {}
    }
    errors.into_result()?;

    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    let password = req.password.unwrap_or_default();
    info!("Received token request for user: {}", email);

    let user = match User::find_by_email(pool.get_ref(), &email).await? {
        Some(user) => user,
        None => {
            info!("Unknown email: {}", email);
            return Err(ApiError::field("non_field_errors", BAD_CREDENTIALS));
        }
    };

    if !verify(&password, &user.password_hash)? {
        info!("Invalid password for user: {}", email);
        return Err(ApiError::field("non_field_errors", BAD_CREDENTIALS));
    }

    let mut conn = pool.acquire().await?;
    let token = AuthToken::get_or_create(&mut conn, user.id).await?;

    info!("Issued token for user: {}", email);
    Ok(HttpResponse::Ok().json(TokenResponse { token: token.token_key }))
}

pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(&*user))
}

pub async fn update_me(
    pool: web::Data<AnyPool>,
    config: web::Data<Config>,
    user: AuthenticatedUser,
    req: web::Json<UserPayload>,
) -> Result<HttpResponse, ApiError> {
    let changes = req.into_inner().validate(false)?;
    apply_changes(&pool, &config, user.0, changes).await
}

pub async fn partial_update_me(
    pool: web::Data<AnyPool>,
    config: web::Data<Config>,
    user: AuthenticatedUser,
    req: web::Json<UserPayload>,
) -> Result<HttpResponse, ApiError> {
    let changes = req.into_inner().validate(true)?;
    apply_changes(&pool, &config, user.0, changes).await
}

async fn apply_changes(
    pool: &AnyPool,
    config: &Config,
    mut user: User,
    changes: UserChanges,
) -> Result<HttpResponse, ApiError> {
    if let Some(email) = changes.email {
        if email != user.email {
            if User::find_by_email(pool, &email).await?.is_some() {
                return Err(ApiError::field("email", DUPLICATE_EMAIL));
            }
            user.email = email;
        }
    }
    if let Some(name) = changes.name {
        user.name = name;
    }
    if let Some(password) = changes.password {
        user.password_hash = hash(&password, config.bcrypt_cost)?;
    }

    user.save(pool)
        .await
        .map_err(|e| ApiError::conflict(e, "email", DUPLICATE_EMAIL))?;
    info!("User {} updated their profile", user.id);
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
