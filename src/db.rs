use log::{info, warn};
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyConnection, AnyPool};

use crate::config::Config;

/// SQL flavour behind `DATABASE_URL`. Queries are shared; only DDL differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("mysql:") {
            Some(Dialect::MySql)
        } else if url.starts_with("sqlite:") {
            Some(Dialect::Sqlite)
        } else {
            None
        }
    }

    fn id_column(self) -> &'static str {
        match self {
            Dialect::MySql => "id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY",
            Dialect::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }
}

/// Opens the pool, retrying while the database is still coming up.
pub async fn connect(config: &Config) -> Result<AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let mut attempt = 1;
    loop {
        let result = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => {
                info!("Database available after {} attempt(s)", attempt);
                return Ok(pool);
            }
            Err(e) if attempt < config.connect_retries => {
                warn!(
                    "Database unavailable (attempt {}/{}): {}",
                    attempt, config.connect_retries, e
                );
                tokio::time::sleep(config.retry_interval).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Id of the row the last INSERT on `conn` created. MySQL reports it with
/// the query result; SQLite's driver leaves it empty, so ask the connection.
pub async fn inserted_id(conn: &mut AnyConnection, reported: Option<i64>) -> Result<i64, sqlx::Error> {
    if let Some(id) = reported {
        return Ok(id);
    }
    let (id,): (i64,) = sqlx::query_as("SELECT last_insert_rowid()")
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

// Text columns stay VARCHAR: MySQL reports TEXT as a blob, which the Any
// driver will not decode into a String.
fn schema(dialect: Dialect) -> Vec<String> {
    let id = dialect.id_column();
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS users (
                {id},
                email VARCHAR(255) NOT NULL UNIQUE,
                name VARCHAR(255) NOT NULL,
                password_hash VARCHAR(255) NOT NULL
            )"
        ),
        "CREATE TABLE IF NOT EXISTS auth_tokens (
            token_key VARCHAR(40) NOT NULL PRIMARY KEY,
            user_id BIGINT NOT NULL UNIQUE
        )"
        .to_string(),
        format!(
            "CREATE TABLE IF NOT EXISTS tags (
                {id},
                user_id BIGINT NOT NULL,
                name VARCHAR(255) NOT NULL,
                UNIQUE (user_id, name)
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS recipes (
                {id},
                user_id BIGINT NOT NULL,
                title VARCHAR(255) NOT NULL,
                description VARCHAR(4000) NOT NULL,
                time_minutes BIGINT NOT NULL,
                price_cents BIGINT NOT NULL,
                link VARCHAR(255) NOT NULL
            )"
        ),
        "CREATE TABLE IF NOT EXISTS recipe_tags (
            recipe_id BIGINT NOT NULL,
            tag_id BIGINT NOT NULL,
            PRIMARY KEY (recipe_id, tag_id)
        )"
        .to_string(),
    ]
}

pub async fn migrate(pool: &AnyPool, dialect: Dialect) -> Result<(), sqlx::Error> {
    for statement in schema(dialect) {
        sqlx::query(&statement).execute(pool).await?;
    }
    info!("Database schema is up to date");
    Ok(())
}
