use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub checkout: CheckoutConfig,
}

/// Bounds on a single checkout transaction.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutConfig {
    pub timeout: Duration,
    /// Applied as `SET LOCAL lock_timeout` on Postgres.
    pub lock_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5_000),
            lock_timeout: Duration::from_millis(2_000),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let defaults = CheckoutConfig::default();
        let checkout = CheckoutConfig {
            timeout: millis_from_env("CHECKOUT_TIMEOUT_MS").unwrap_or(defaults.timeout),
            lock_timeout: millis_from_env("CHECKOUT_LOCK_TIMEOUT_MS")
                .unwrap_or(defaults.lock_timeout),
        };

        Ok(Self {
            port,
            database_url,
            host,
            checkout,
        })
    }
}

fn millis_from_env(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
