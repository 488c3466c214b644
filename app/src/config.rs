use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "LIVE_TUI_CONFIG";
pub const BACKEND_URL_ENV: &str = "LIVE_TUI_BACKEND_URL";
const DEFAULT_CONFIG_PATH: &str = "./live-tui.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid backend url `{0}`")]
    BackendUrl(String),
    #[error("Invalid log level `{0}`")]
    LogLevel(String),
    #[error("At least one channel must be configured")]
    NoChannels,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub backend_url: String,
    pub live_namespace: String,
    pub use_mock_apis: bool,

    pub session_ttl_secs: u64,
    /// Directory where the session is kept between runs. Not persisted when absent.
    pub session_dir: Option<PathBuf>,

    /// Rows scrolled by Up/Down while the comment input is focused.
    pub comment_scroll_step: i32,
    pub max_comments: usize,

    pub reconnection_attempts: u32,
    pub reconnection_delay_ms: u64,
    pub connect_timeout_ms: u64,
    /// Wait for the live feed to reconnect before posting a comment over HTTP.
    pub comment_fallback_delay_ms: u64,

    pub default_city: String,
    pub location: Option<Location>,

    pub channels: Vec<String>,
    /// External player spawned with the stream url as its only argument, e.g. `mpv`.
    pub player_command: Option<String>,

    pub tick_rate_ms: u64,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            live_namespace: "/live".to_string(),
            use_mock_apis: false,

            session_ttl_secs: 10 * 60,
            session_dir: None,

            comment_scroll_step: 3,
            max_comments: 50,

            reconnection_attempts: 5,
            reconnection_delay_ms: 1000,
            connect_timeout_ms: 5000,
            comment_fallback_delay_ms: 1000,

            default_city: "Paris".to_string(),
            location: None,

            channels: ["tv5monde", "france24", "info6", "animesama", "tvanime"]
                .into_iter()
                .map(String::from)
                .collect(),
            player_command: None,

            tick_rate_ms: 50,
            log_file: PathBuf::from("./log"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the config from `LIVE_TUI_CONFIG` (or `./live-tui.toml`), falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            config.backend_url = url;
        }

        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend_url()?;
        self.log_level()?;

        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }

        Ok(())
    }

    pub fn backend_url(&self) -> Result<url::Url, ConfigError> {
        url::Url::parse(&self.backend_url)
            .map_err(|_| ConfigError::BackendUrl(self.backend_url.clone()))
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs as i64)
    }

    pub fn reconnection_delay(&self) -> Duration {
        Duration::from_millis(self.reconnection_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn comment_fallback_delay(&self) -> Duration {
        Duration::from_millis(self.comment_fallback_delay_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();

        assert_eq!(config.log_level().unwrap(), LevelFilter::Info);
        assert_eq!(config.session_ttl(), chrono::Duration::minutes(10));
        assert_eq!(config.channels.first().map(String::as_str), Some("tv5monde"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            backend_url = "http://192.168.1.90:5000"
            comment_scroll_step = 50
            location = { lat = 48.8566, lon = 2.3522 }
            "#,
        )
        .unwrap();

        assert_eq!(config.backend_url, "http://192.168.1.90:5000");
        assert_eq!(config.comment_scroll_step, 50);
        assert_eq!(
            config.location,
            Some(Location {
                lat: 48.8566,
                lon: 2.3522
            })
        );
        assert_eq!(config.max_comments, 50);
        assert_eq!(config.reconnection_attempts, 5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_toml("unknown_key = 1").is_err());

        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::LogLevel(_))));

        let config = Config {
            backend_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::BackendUrl(_))));

        let config = Config {
            channels: vec![],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoChannels)));
    }
}
