//! Fixtures shared by the HTTP and model tests.

use actix_web::http::header;
use actix_web::web;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::config::Config;
use crate::db::{self, Dialect};
use crate::models::token::AuthToken;
use crate::models::user::User;
use crate::routes::routes;

/// A fresh in-memory database. A single long-lived connection keeps every
/// query on the same SQLite memory instance.
pub async fn test_pool() -> AnyPool {
    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    db::migrate(&pool, Dialect::Sqlite).await.expect("migrate");
    pool
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("test config")
}

/// Wires the whole API the same way `main` does.
pub fn configure(pool: AnyPool) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(pool))
            .app_data(web::Data::new(test_config()))
            .app_data(routes::json_config())
            .app_data(routes::query_config());
        routes::api_configure(cfg);
    }
}

pub async fn create_user(pool: &AnyPool, email: &str, password: &str) -> User {
    let password_hash = bcrypt::hash(password, 4).expect("hash");
    let mut conn = pool.acquire().await.expect("connection");
    User::create(&mut conn, email, "Test Name", &password_hash)
        .await
        .expect("create user")
}

pub async fn token_for(pool: &AnyPool, user: &User) -> String {
    let mut conn = pool.acquire().await.expect("connection");
    AuthToken::get_or_create(&mut conn, user.id)
        .await
        .expect("token")
        .token_key
}

pub fn auth_header(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Token {}", token))
}
