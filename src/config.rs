use std::env;
use std::str::FromStr;

use anyhow::{Context, anyhow};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_ttl_hours: i64,
    pub db_max_connections: u32,
}

/// Optional setting: absent means `default`, present but malformed is an error.
fn setting<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow!("{key} has an invalid value: {raw:?}")),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let session_ttl_hours = setting(&lookup, "SESSION_TTL_HOURS", 24i64)?;
        let db_max_connections = setting(&lookup, "DB_MAX_CONNECTIONS", 5u32)?;

        if session_ttl_hours <= 0 {
            return Err(anyhow!("SESSION_TTL_HOURS must be positive"));
        }

        Ok(Self {
            database_url,
            bind_addr,
            session_ttl_hours,
            db_max_connections,
        })
    }
}
