//! Configuration Module
//! Snapshot root, pending directory and provider polling settings.

use crate::fetch::DEFAULT_SOURCE_URL;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_CONFIG: &str = "COVID19RU_CONFIG";
pub const ENV_ROOT: &str = "COVID19RU_ROOT";
pub const ENV_PENDING: &str = "COVID19RU_PENDING";
pub const ENV_SOURCE_URL: &str = "COVID19RU_SOURCE_URL";
pub const ENV_POLL_SECS: &str = "COVID19RU_POLL_SECS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Folder of daily snapshot CSV files.
    pub data_root: PathBuf,
    /// Folder receiving pending JSON/CSV dumps.
    pub pending_dir: PathBuf,
    pub source_url: String,
    /// Seconds between polls in continuous mode.
    pub poll_interval: u64,
    /// Seconds before a page request is abandoned.
    pub request_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("./data"),
            pending_dir: PathBuf::from("./pending"),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            poll_interval: 60,
            request_timeout: 30,
        }
    }
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then the file named by `COVID19RU_CONFIG`, then single-value overrides.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = match lookup(ENV_CONFIG) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        settings.apply_env_overrides(lookup)?;
        Ok(settings)
    }

    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(root) = lookup(ENV_ROOT) {
            self.data_root = PathBuf::from(root);
        }
        if let Some(pending) = lookup(ENV_PENDING) {
            self.pending_dir = PathBuf::from(pending);
        }
        if let Some(url) = lookup(ENV_SOURCE_URL) {
            self.source_url = url;
        }
        if let Some(secs) = lookup(ENV_POLL_SECS) {
            self.poll_interval = secs
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_POLL_SECS.to_string(),
                    value: secs,
                })?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.data_root, PathBuf::from("./data"));
        assert_eq!(s.poll_interval(), Duration::from_secs(60));
        assert_eq!(s.request_timeout(), Duration::from_secs(30));
        assert_eq!(s.source_url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let s = Settings::from_toml_str("data_root = \"/srv/csse\"\npoll_interval = 300\n").unwrap();
        assert_eq!(s.data_root, PathBuf::from("/srv/csse"));
        assert_eq!(s.poll_interval, 300);
        assert_eq!(s.pending_dir, PathBuf::from("./pending"));
    }

    #[test]
    fn unknown_toml_key_is_rejected() {
        assert!(matches!(
            Settings::from_toml_str("data_rot = \"x\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("covid19ru.toml");
        fs::write(&file, "pending_dir = \"/from/file\"\ndata_root = \"/from/file\"\n").unwrap();

        let s = Settings::from_env(env(&[
            (ENV_CONFIG, file.to_str().unwrap()),
            (ENV_ROOT, "/from/env"),
        ]))
        .unwrap();
        assert_eq!(s.data_root, PathBuf::from("/from/env"));
        assert_eq!(s.pending_dir, PathBuf::from("/from/file"));
    }

    #[test]
    fn bad_poll_interval() {
        let err = Settings::from_env(env(&[(ENV_POLL_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        let err = Settings::from_env(env(&[(ENV_POLL_SECS, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn missing_config_file() {
        let err = Settings::load(Path::new("/nonexistent/covid19ru.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
