// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr, str::FromStr};

/// Credentials for the admin account created on first start.
#[derive(Clone, Debug)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub session_secret: String,
    pub bind_addr: SocketAddr,
    pub session_secure: bool,
    /// Upper bound on concurrent upserts issued by a bulk update.
    pub bulk_concurrency: usize,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let session_secret = env::var("SESSION_SECRET")?;
        if session_secret.len() < 64 {
            return Err(AppError::ConfigError(
                "SESSION_SECRET must be at least 64 bytes long".to_string(),
            ));
        }

        let bind_addr = parse_var("BIND_ADDR", "0.0.0.0:3000")?;
        let session_secure = parse_var("SESSION_SECURE", "false")?;
        let bulk_concurrency: usize = parse_var("BULK_CONCURRENCY", "4")?;
        if bulk_concurrency == 0 {
            return Err(AppError::ConfigError(
                "BULK_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        let bootstrap_admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin {
                name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            session_secret,
            bind_addr,
            session_secure,
            bulk_concurrency,
            bootstrap_admin,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> AppResult<T> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| AppError::ConfigError(format!("{} has an invalid value: '{}'", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_uses_default() {
        let value: usize = parse_var("TIMESHEET_TEST_UNSET_VAR", "7").unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_parse_var_rejects_garbage_default() {
        let result: AppResult<usize> = parse_var("TIMESHEET_TEST_UNSET_VAR_2", "seven");
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
