//! Configuration for the relay server.
//!
//! Defaults can be overridden with environment variables:
//!
//! - `SYNC_BIND_ADDR`            (default: "0.0.0.0")
//! - `PORT`                      (default: "3001")
//! - `SYNC_ALLOWED_ORIGINS`      (default: "http://localhost:3000,http://127.0.0.1:3000")
//! - `SYNC_MAX_SCREEN_INSTANCES` (default: "3")
//! - `SYNC_MAX_CONNECTIONS`      (default: "1024")

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context};
use sync_core::{RelayConfig, DEFAULT_MAX_INSTANCES_PER_SCREEN};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Origins allowed to open websockets and make CORS requests.
    pub allowed_origins: Vec<String>,

    /// Live instances allowed per screen id before the oldest is evicted.
    pub max_screen_instances: usize,

    /// Maximum number of simultaneously open websockets.
    pub max_connections: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            max_screen_instances: DEFAULT_MAX_INSTANCES_PER_SCREEN,
            max_connections: 1024,
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let bind_addr = lookup("SYNC_BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port = read_or_default(&lookup, "PORT", defaults.port)?;
        let max_screen_instances =
            read_or_default(&lookup, "SYNC_MAX_SCREEN_INSTANCES", defaults.max_screen_instances)?;
        let max_connections = read_or_default(&lookup, "SYNC_MAX_CONNECTIONS", defaults.max_connections)?;

        let allowed_origins = match lookup("SYNC_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.allowed_origins,
        };

        if max_screen_instances == 0 {
            bail!("SYNC_MAX_SCREEN_INSTANCES must be at least 1");
        }

        Ok(Config {
            bind_addr,
            port,
            allowed_origins,
            max_screen_instances,
            max_connections,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            max_instances_per_screen: self.max_screen_instances,
        }
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

fn read_or_default<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, val)),
        None => Ok(default),
    }
}
