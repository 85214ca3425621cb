use std::{env, fmt::Display, str::FromStr};

use anyhow::{anyhow, Context};
use tracing::info;

/// Matches the recents capacity the review pages were built around.
pub const DEFAULT_REVIEWS_RECENT_TOTAL: usize = 50;

pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub reviews_recent_total: usize,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set to a production Postgres instance")?,
            max_connections: try_load("DATABASE_MAX_CONNECTIONS", "5")?,
            reviews_recent_total: try_load(
                "REVIEWS_RECENT_TOTAL",
                &DEFAULT_REVIEWS_RECENT_TOTAL.to_string(),
            )?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse_value(key, &raw)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("invalid {key} value {raw:?}: {e}"))
}
