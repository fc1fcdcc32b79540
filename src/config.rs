use std::env;
use thiserror::Error;

use crate::service::AuthSettings;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BootstrapManager {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` runs on the in-process store.
    pub database_url: Option<String>,
    pub port: u16,
    pub run_migrations: bool,
    pub auth: AuthSettings,
    pub bootstrap_manager: Option<BootstrapManager>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = get("DATABASE_URL");
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let port = parse_or(get("PORT"), "PORT", 3000u16)?;
        let token_ttl_hours = parse_or(get("TOKEN_TTL_HOURS"), "TOKEN_TTL_HOURS", 24i64)?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            });
        }
        let bcrypt_cost = parse_or(get("BCRYPT_COST"), "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let run_migrations = match get("RUN_MIGRATIONS").as_deref() {
            None | Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "RUN_MIGRATIONS",
                    value: other.to_string(),
                })
            }
        };

        let bootstrap_manager = match (get("BOOTSTRAP_MANAGER_USERNAME"), get("BOOTSTRAP_MANAGER_PASSWORD")) {
            (Some(username), Some(password)) => Some(BootstrapManager { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("BOOTSTRAP_MANAGER_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("BOOTSTRAP_MANAGER_USERNAME")),
        };

        Ok(Self {
            database_url,
            port,
            run_migrations,
            auth: AuthSettings {
                jwt_secret,
                token_ttl_hours,
                bcrypt_cost,
            },
            bootstrap_manager,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
