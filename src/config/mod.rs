use std::env;

/// Longest revenue window the dashboard accepts, in days.
pub const MAX_REVENUE_WINDOW_DAYS: i64 = 3650;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Missing(#[from] env::VarError),

    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    /// Session blocklist backend; an in-process set is used when unset.
    pub redis_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub frontend_url: String,
    pub revenue_window_days: i64,
    pub currency_symbol: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "authenticated".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            revenue_window_days: revenue_window_days(
                env::var("REVENUE_WINDOW_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            )?,
            currency_symbol: env::var("CURRENCY_SYMBOL").unwrap_or_else(|_| "₹".to_string()),
        })
    }

    /// Defaults for everything but the required secrets, for wiring tests.
    pub fn with_secrets(database_url: &str, jwt_secret: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            database_max_connections: 10,
            redis_url: None,
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: jwt_secret.to_string(),
            jwt_audience: "authenticated".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            revenue_window_days: 30,
            currency_symbol: "₹".to_string(),
        }
    }
}

fn revenue_window_days(value: i64) -> Result<i64, ConfigError> {
    if !(1..=MAX_REVENUE_WINDOW_DAYS).contains(&value) {
        return Err(ConfigError::OutOfRange {
            key: "REVENUE_WINDOW_DAYS",
            value,
            min: 1,
            max: MAX_REVENUE_WINDOW_DAYS,
        });
    }
    Ok(value)
}
