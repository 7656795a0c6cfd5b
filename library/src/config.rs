use log::warn;
use std::path::PathBuf;
use std::time::Duration;

use crate::{FETCH_INTERVAL, FETCH_TIMEOUT};

pub const DEFAULT_API_URL: &str = "https://api.ambientweather.net/v1/devices";
pub const DEFAULT_DATABASE_URL: &str = "weather.db";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";

/// Process configuration, read from the environment (and `.env`, which the
/// binary loads before calling `from_env`).
#[derive(Clone, Debug)]
pub struct Config {
    /// Upstream API key; checked on every fetch cycle, not at startup
    pub api_key: Option<String>,
    /// Upstream application key
    pub app_key: Option<String>,
    /// Devices endpoint of the upstream API
    pub api_url: String,
    pub database_url: String,
    pub bind_address: String,
    /// Root directory for static assets
    pub static_dir: PathBuf,
    pub fetch_interval: Duration,
    /// Bound on one upstream request, body included
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            app_key: None,
            api_url: DEFAULT_API_URL.to_owned(),
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            bind_address: DEFAULT_BIND_ADDRESS.to_owned(),
            static_dir: PathBuf::from("."),
            fetch_interval: FETCH_INTERVAL,
            fetch_timeout: FETCH_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        Config::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from any variable lookup. Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let fetch_interval = match var("FETCH_INTERVAL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(
                        "ignoring FETCH_INTERVAL_SECS={:?}, using {}s",
                        raw,
                        defaults.fetch_interval.as_secs()
                    );
                    defaults.fetch_interval
                }
            },
            None => defaults.fetch_interval,
        };

        Config {
            api_key: var("AMBIENT_API_KEY"),
            app_key: var("AMBIENT_APP_KEY"),
            api_url: var("AMBIENT_API_URL").unwrap_or(defaults.api_url),
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_address: var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            static_dir: var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            fetch_interval,
            fetch_timeout: defaults.fetch_timeout,
        }
    }
}
