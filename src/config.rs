use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::db::Dialect;
use crate::errors::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub dialect: Dialect,
    pub server_address: String,
    pub max_connections: u32,
    pub connect_retries: u32,
    pub retry_interval: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let dialect = Dialect::from_url(&database_url).ok_or_else(|| ConfigError::Invalid {
            name: "DATABASE_URL",
            value: database_url.clone(),
        })?;

        let server_address =
            lookup("SERVER_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?;
        let connect_retries = parse_or(&lookup, "DATABASE_CONNECT_RETRIES", 10)?;
        let retry_secs: u64 = parse_or(&lookup, "DATABASE_RETRY_INTERVAL_SECS", 1)?;
        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;

        if max_connections == 0 {
            return Err(invalid("DATABASE_MAX_CONNECTIONS", max_connections));
        }
        if connect_retries == 0 {
            return Err(invalid("DATABASE_CONNECT_RETRIES", connect_retries));
        }
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(invalid("BCRYPT_COST", bcrypt_cost));
        }

        Ok(Config {
            database_url,
            dialect,
            server_address,
            max_connections,
            connect_retries,
            retry_interval: Duration::from_secs(retry_secs),
            bcrypt_cost,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

fn invalid(name: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
    }
}
