use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_GEOCODE_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";
pub const DEFAULT_ONECALL_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// Redis connection and entry lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
    /// Seconds a cached lookup stays valid. Zero disables caching.
    pub ttl_secs: u64,
    /// Upper bound on the initial Redis handshake.
    pub connect_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            ttl_secs: 900,
            connect_timeout_secs: 2,
        }
    }
}

impl CacheConfig {
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/0", self.host, self.port)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Provider endpoints; overridable so tests can point at a mock server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub geocode_url: String,
    pub onecall_url: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            onecall_url: DEFAULT_ONECALL_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [cache]
/// host = "redis"
/// port = 6379
/// ttl_secs = 900
/// connect_timeout_secs = 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeatherMap API key.
    pub api_key: Option<String>,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Return the configured API key, or an error with a hint on how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeatherMap API key configured.\n\
                     Hint: run `checkweather configure` or set OPENWEATHERMAP_API_KEY."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Load config from disk (or defaults on first run), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    /// Load config from disk only, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Override file values with `OPENWEATHERMAP_API_KEY`, `REDIS_HOST`,
    /// `REDIS_PORT` and `CACHE_TTL` when `lookup` yields them.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENWEATHERMAP_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(host) = lookup("REDIS_HOST") {
            self.cache.host = host;
        }
        if let Some(port) = lookup("REDIS_PORT") {
            self.cache.port = port
                .trim()
                .parse()
                .with_context(|| format!("REDIS_PORT is not a valid port: '{port}'"))?;
        }
        if let Some(ttl) = lookup("CACHE_TTL") {
            self.cache.ttl_secs = ttl
                .trim()
                .parse()
                .with_context(|| format!("CACHE_TTL is not a number of seconds: '{ttl}'"))?;
        }
        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "checkweather", "checkweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No OpenWeatherMap API key configured"));
        assert!(err.to_string().contains("checkweather configure"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("  ".into());
        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn defaults_cover_redis_and_ttl() {
        let cfg = Config::default();
        assert_eq!(cfg.cache.port, 6379);
        assert_eq!(cfg.cache.ttl(), Duration::from_secs(900));
        assert_eq!(cfg.upstream.onecall_url, DEFAULT_ONECALL_URL);
        assert_eq!(cfg.cache.redis_url(), "redis://127.0.0.1:6379/0");
        assert_eq!(cfg.cache.connect_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"

            [cache]
            host = "redis"
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.api_key().unwrap(), "KEY");
        assert_eq!(cfg.cache.host, "redis");
        assert_eq!(cfg.cache.port, 6379);
        assert_eq!(cfg.cache.ttl_secs, 900);
        assert_eq!(cfg.cache.connect_timeout_secs, 2);
        assert_eq!(cfg.upstream.timeout_secs, 10);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.apply_env(env(&[
            ("OPENWEATHERMAP_API_KEY", "ENV_KEY"),
            ("REDIS_HOST", "redis"),
            ("REDIS_PORT", "6380"),
            ("CACHE_TTL", "60"),
        ]))
        .expect("overrides are valid");

        assert_eq!(cfg.api_key().unwrap(), "ENV_KEY");
        assert_eq!(cfg.cache.redis_url(), "redis://redis:6380/0");
        assert_eq!(cfg.cache.ttl_secs, 60);
    }

    #[test]
    fn invalid_numeric_override_is_an_error() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(env(&[("CACHE_TTL", "fifteen")])).unwrap_err();
        assert!(err.to_string().contains("CACHE_TTL"));
    }

    #[test]
    fn toml_roundtrip_preserves_values() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.cache.ttl_secs = 120;

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }
}
