use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub request_timeout: Duration,
    pub hash: HashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let defaults = HashConfig::default();

        Ok(Self {
            database_url,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
            db_max_connections: parse_nonzero(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout: Duration::from_secs(parse_nonzero(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                5,
            )?),
            request_timeout: Duration::from_secs(parse_nonzero(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                30,
            )?),
            hash: HashConfig {
                memory_kib: parse_or(&lookup, "HASH_MEMORY_KIB", defaults.memory_kib)?,
                iterations: parse_or(&lookup, "HASH_ITERATIONS", defaults.iterations)?,
                parallelism: parse_or(&lookup, "HASH_PARALLELISM", defaults.parallelism)?,
            },
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has invalid value {raw:?}")),
        None => Ok(default),
    }
}

fn parse_nonzero<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialEq,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = parse_or(lookup, key, default)?;
    anyhow::ensure!(value != T::default(), "{key} must be greater than zero");
    Ok(value)
}
