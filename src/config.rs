use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use sqlx::postgres::PgConnectOptions;

/// Upper bound for `JWT_EXPIRATION_SECONDS` (ten years).
pub const MAX_JWT_TTL_SECONDS: i64 = 10 * 365 * 24 * 3600;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full connection URL; takes precedence over the individual parts.
    pub url: Option<String>,
    pub user: String,
    pub password: String,
    /// `host` or `host:port`.
    pub address: String,
    pub name: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db: DbConfig,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let db = DbConfig {
            url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            user: get("DB_USER", "postgres"),
            password: get("DB_PASSWORD", ""),
            address: get("DB_ADDRESS", "127.0.0.1:5432"),
            name: get("DB_NAME", "ecom"),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            acquire_timeout_secs: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5)?,
        };

        let secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        let ttl_seconds: i64 = parse_or(&lookup, "JWT_EXPIRATION_SECONDS", 3600 * 24 * 7)?;
        if !(1..=MAX_JWT_TTL_SECONDS).contains(&ttl_seconds) {
            bail!("JWT_EXPIRATION_SECONDS must be between 1 and {MAX_JWT_TTL_SECONDS}, got {ttl_seconds}");
        }
        let jwt = JwtConfig {
            secret,
            issuer: get("JWT_ISSUER", "ecom-api"),
            audience: get("JWT_AUDIENCE", "ecom-api-users"),
            ttl_seconds,
        };

        Ok(Self {
            db,
            jwt,
            host: get("APP_HOST", "0.0.0.0"),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10)?,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl DbConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).context("parse DATABASE_URL");
        }

        let (host, port) = match self.address.rsplit_once(':') {
            Some((host, port)) => (
                host,
                port.parse::<u16>()
                    .with_context(|| format!("invalid port in DB_ADDRESS {}", self.address))?,
            ),
            None => (self.address.as_str(), 5432),
        };

        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .username(&self.user)
            .database(&self.name);
        if !self.password.is_empty() {
            opts = opts.password(&self.password);
        }
        Ok(opts)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
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
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
