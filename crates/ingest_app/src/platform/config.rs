//! Start-up configuration: defaults, then `ingest.ron`, then environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ingest_core::{CoreConfig, PollSchedule, SubmitMode, DEFAULT_MAX_TOTAL_MB};
use ingest_engine::ClientSettings;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "ingest.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    backend_url: Option<String>,
    sync_mode: Option<bool>,
    max_total_mb: Option<u64>,
    poll_base_ms: Option<u64>,
    poll_step_ms: Option<u64>,
    poll_cap_ms: Option<u64>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    log_to_terminal: Option<bool>,
}

/// Resolved once at start-up and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub mode: SubmitMode,
    pub max_total_mb: u64,
    pub poll: PollSchedule,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub log_to_terminal: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let settings = ClientSettings::default();
        Self {
            backend_url: settings.base_url,
            mode: SubmitMode::Async,
            max_total_mb: DEFAULT_MAX_TOTAL_MB,
            poll: PollSchedule::default(),
            connect_timeout: settings.connect_timeout,
            request_timeout: settings.request_timeout,
            log_to_terminal: false,
        }
    }
}

impl ClientConfig {
    /// Loads `dir/ingest.ron` when present, then applies `BACKEND_URL`,
    /// `SYNC_MODE`, `MAX_TOTAL_MB` and `LOG_TO_TERMINAL` from `env`.
    pub fn load(
        dir: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILENAME);
        let config = match fs::read_to_string(&path) {
            Ok(text) => {
                let file: ConfigFile = ron::from_str(&text).map_err(|err| ConfigError::Parse {
                    path: path.clone(),
                    message: err.to_string(),
                })?;
                Self::default().with_file(file)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        config.with_env(env)
    }

    pub fn core(&self) -> CoreConfig {
        CoreConfig {
            max_total_mb: self.max_total_mb,
            mode: self.mode,
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.backend_url.clone(),
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
        }
    }

    fn with_file(mut self, file: ConfigFile) -> Self {
        if let Some(url) = file.backend_url {
            self.backend_url = url;
        }
        if let Some(sync) = file.sync_mode {
            self.mode = mode_from_flag(sync);
        }
        if let Some(limit) = file.max_total_mb {
            self.max_total_mb = limit;
        }
        let millis = |value: Option<u64>, fallback: Duration| {
            value.map(Duration::from_millis).unwrap_or(fallback)
        };
        self.poll = PollSchedule::new(
            millis(file.poll_base_ms, self.poll.base()),
            millis(file.poll_step_ms, self.poll.step()),
            millis(file.poll_cap_ms, self.poll.cap()),
        );
        if let Some(secs) = file.connect_timeout_secs {
            self.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(flag) = file.log_to_terminal {
            self.log_to_terminal = flag;
        }
        self
    }

    fn with_env(mut self, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = env("BACKEND_URL").filter(|url| !url.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(raw) = env("SYNC_MODE") {
            self.mode = mode_from_flag(parse_flag("SYNC_MODE", &raw)?);
        }
        if let Some(raw) = env("MAX_TOTAL_MB") {
            self.max_total_mb = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "MAX_TOTAL_MB",
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = env("LOG_TO_TERMINAL") {
            self.log_to_terminal = parse_flag("LOG_TO_TERMINAL", &raw)?;
        }
        Ok(self)
    }
}

fn mode_from_flag(sync: bool) -> SubmitMode {
    if sync {
        SubmitMode::Sync
    } else {
        SubmitMode::Async
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = ClientConfig::load(temp.path(), env_of(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.mode, SubmitMode::Async);
        assert_eq!(config.max_total_mb, 50);
    }

    #[test]
    fn file_values_are_applied() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            "(backend_url: Some(\"http://backend:9000\"), sync_mode: Some(true), poll_cap_ms: Some(3000))",
        )
        .unwrap();

        let config = ClientConfig::load(temp.path(), env_of(&[])).unwrap();
        assert_eq!(config.backend_url, "http://backend:9000");
        assert_eq!(config.mode, SubmitMode::Sync);
        assert_eq!(config.poll.cap(), Duration::from_millis(3000));
        assert_eq!(config.poll.base(), Duration::from_millis(750));
    }

    #[test]
    fn env_overrides_file() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            "(max_total_mb: Some(10), sync_mode: Some(true))",
        )
        .unwrap();

        let env = env_of(&[("MAX_TOTAL_MB", "25"), ("SYNC_MODE", "false")]);
        let config = ClientConfig::load(temp.path(), env).unwrap();
        assert_eq!(config.max_total_mb, 25);
        assert_eq!(config.mode, SubmitMode::Async);
        assert_eq!(config.core().max_total_mb, 25);
    }

    #[test]
    fn invalid_env_value_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = ClientConfig::load(temp.path(), env_of(&[("MAX_TOTAL_MB", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "MAX_TOTAL_MB", .. }));
    }

    #[test]
    fn malformed_file_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "(backend_url: 42").unwrap();
        let err = ClientConfig::load(temp.path(), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
