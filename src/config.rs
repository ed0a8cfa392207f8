// Runtime configuration
//
// Read once at startup and passed into `AppState`; nothing reads the
// environment after that.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::pricing::{AddonTaxPolicy, GstPolicy};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub db_max_connections: u32,
    pub gst: GstPolicy,
    pub addon_tax: AddonTaxPolicy,
}

impl Config {
    /// Load configuration from process environment variables
    ///
    /// ## Environment Variables
    /// - `DATABASE_URL`: required
    /// - `JWT_SECRET`: required, shared with the token issuer
    /// - `HOST` / `PORT`: bind address, default `0.0.0.0:8080`
    /// - `GST_THRESHOLD`, `GST_STANDARD_RATE`, `GST_PREMIUM_RATE`: GST brackets
    /// - `ADDON_TAX_POLICY`: `exempt` (default) or `taxed`
    /// - `DB_MAX_CONNECTIONS`: pool size, default 5
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let defaults = GstPolicy::default();

        let config = Config {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            gst: GstPolicy {
                threshold: parse_or(&lookup, "GST_THRESHOLD", defaults.threshold)?,
                standard_rate: parse_or(&lookup, "GST_STANDARD_RATE", defaults.standard_rate)?,
                premium_rate: parse_or(&lookup, "GST_PREMIUM_RATE", defaults.premium_rate)?,
            },
            addon_tax: parse_or(&lookup, "ADDON_TAX_POLICY", AddonTaxPolicy::default())?,
        };
        config.check_rates()?;
        Ok(config)
    }

    /// GST rates are fractions; anything outside 0..=1 is a misconfiguration
    fn check_rates(&self) -> Result<(), ConfigError> {
        for (name, rate) in [
            ("GST_STANDARD_RATE", self.gst.standard_rate),
            ("GST_PREMIUM_RATE", self.gst.premium_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ConfigError::Invalid {
                    name,
                    value: rate.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
