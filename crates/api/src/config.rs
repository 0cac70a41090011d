//! Process configuration, read from the environment.
//!
//! `main` loads `.env` (via `dotenvy`) before anything reads it.

use anyhow::{Context, bail};
use chrono::Duration;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Longest accepted session lifetime.
const MAX_JWT_EXPIRY_DAYS: i64 = 365;

/// Credentials for the admin account created at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry: Duration,
    /// Postgres connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub admin: Option<AdminSeed>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiry: Duration::hours(24),
            database_url: None,
            admin: None,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("APP_PORT") {
            Some(raw) => raw.parse().with_context(|| format!("APP_PORT is not a port number: {raw}"))?,
            None => defaults.port,
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            defaults.jwt_secret.clone()
        });

        let jwt_expiry = match get("JWT_EXPIRY") {
            Some(raw) => parse_expiry(&raw)?,
            None => defaults.jwt_expiry,
        };

        let admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                username: get("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
                email,
                password,
            }),
            (None, None) => None,
            _ => bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            port,
            jwt_secret,
            jwt_expiry,
            database_url: get("DATABASE_URL"),
            admin,
        })
    }
}

/// Token lifetime: `24h`, `30m`, or a bare number of hours.
pub fn parse_expiry(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last() {
        Some((i, 'h')) | Some((i, 'H')) => (&raw[..i], 'h'),
        Some((i, 'm')) | Some((i, 'M')) => (&raw[..i], 'm'),
        _ => (raw, 'h'),
    };
    let n: i64 = digits
        .trim()
        .parse()
        .with_context(|| format!("JWT_EXPIRY must look like 24h, 30m or 24 (got {raw:?})"))?;
    if n <= 0 {
        bail!("JWT_EXPIRY must be positive (got {raw:?})");
    }
    let ttl = match unit {
        'm' => Duration::try_minutes(n),
        _ => Duration::try_hours(n),
    };
    match ttl {
        Some(ttl) if ttl <= Duration::days(MAX_JWT_EXPIRY_DAYS) => Ok(ttl),
        _ => bail!("JWT_EXPIRY must be at most {MAX_JWT_EXPIRY_DAYS} days (got {raw:?})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]).unwrap(), ApiConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config(&[
            ("APP_PORT", "9000"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRY", "30m"),
            ("DATABASE_URL", "postgres://lsp@localhost/lsp"),
            ("ADMIN_EMAIL", "admin@lsp.id"),
            ("ADMIN_PASSWORD", "admin-secret"),
        ])
        .unwrap();

        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.jwt_expiry, Duration::minutes(30));
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://lsp@localhost/lsp"));
        let admin = cfg.admin.unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.email, "admin@lsp.id");
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        assert_eq!(config(&[("DATABASE_URL", "  ")]).unwrap().database_url, None);
    }

    #[test]
    fn half_configured_admin_is_an_error() {
        assert!(config(&[("ADMIN_EMAIL", "admin@lsp.id")]).is_err());
    }

    #[test]
    fn expiry_formats() {
        assert_eq!(parse_expiry("24h").unwrap(), Duration::hours(24));
        assert_eq!(parse_expiry("72").unwrap(), Duration::hours(72));
        assert_eq!(parse_expiry("15m").unwrap(), Duration::minutes(15));
        assert!(parse_expiry("0h").is_err());
        assert!(parse_expiry("soon").is_err());
        assert!(parse_expiry("h").is_err());
    }

    #[test]
    fn out_of_range_expiry_is_rejected() {
        assert_eq!(parse_expiry("8760h").unwrap(), Duration::days(365));
        assert!(parse_expiry("8761h").is_err());
        assert!(parse_expiry("2000000000000h").is_err());
        assert!(parse_expiry("9999999999999h").is_err());
        assert!(parse_expiry("9999999999999999m").is_err());
        assert!(config(&[("JWT_EXPIRY", "9999999999999h")]).is_err());
    }
}
