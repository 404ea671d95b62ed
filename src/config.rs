use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use tracing::{info, warn};

pub static CONFIG: Lazy<Config> = Lazy::new(Config::init);

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base of the websocket links handed out for new orders.
    pub public_ws_base: String,
    pub vendors_file: Option<PathBuf>,
    pub default_max_distance_km: f64,
    pub nearby_notify_km: f64,
    pub max_concurrent_orders: usize,
    /// Tracking sessions with no traffic for this long are closed.
    pub session_idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_ws_base: "ws://localhost:3000".to_string(),
            vendors_file: None,
            default_max_distance_km: 10.0,
            nearby_notify_km: 0.5,
            max_concurrent_orders: 10_000,
            session_idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl Config {
    pub fn init() -> Config {
        let defaults = Config::default();

        Config {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: load("PORT", defaults.port),
            public_ws_base: env::var("PUBLIC_WS_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_ws_base),
            vendors_file: env::var("VENDORS_FILE").ok().map(PathBuf::from),
            default_max_distance_km: load_distance(
                "DEFAULT_MAX_DISTANCE_KM",
                defaults.default_max_distance_km,
            ),
            nearby_notify_km: load_distance("NEARBY_NOTIFY_KM", defaults.nearby_notify_km),
            max_concurrent_orders: load("MAX_CONCURRENT_ORDERS", defaults.max_concurrent_orders),
            session_idle_timeout: Duration::from_secs(load(
                "SESSION_IDLE_TIMEOUT_SECS",
                defaults.session_idle_timeout.as_secs(),
            )),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => {
            info!("{} not set, using default: {}", key, default);
            default
        }
    }
}

fn load_distance(key: &str, default: f64) -> f64 {
    non_negative_or(key, load(key, default), default)
}

fn non_negative_or(key: &str, value: f64, default: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        warn!(
            "{} must be a non-negative distance, got {}, using default: {}",
            key, value, default
        );
        default
    } else {
        value
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {} value {:?}: {}, using default: {}", key, raw, e, default);
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.default_max_distance_km, 10.0);
        assert!(config.vendors_file.is_none());
    }

    #[test]
    fn falls_back_on_unparsable_values() {
        assert_eq!(parse_or("PORT", "80a", 3000u16), 3000);
        assert_eq!(parse_or("PORT", " 8080 ", 3000u16), 8080);
        assert_eq!(parse_or("NEARBY_NOTIFY_KM", "0.25", 0.5f64), 0.25);
    }

    #[test]
    fn distances_must_be_non_negative() {
        assert_eq!(non_negative_or("DEFAULT_MAX_DISTANCE_KM", -3.0, 10.0), 10.0);
        assert_eq!(non_negative_or("DEFAULT_MAX_DISTANCE_KM", f64::NAN, 10.0), 10.0);
        assert_eq!(non_negative_or("DEFAULT_MAX_DISTANCE_KM", 0.0, 10.0), 0.0);
        assert_eq!(non_negative_or("DEFAULT_MAX_DISTANCE_KM", 25.0, 10.0), 25.0);
    }
}
