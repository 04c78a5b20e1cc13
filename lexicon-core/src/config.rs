//! Persisted player configuration: which backend to use and its credentials.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "lexicon";
const CONFIG_FILE: &str = "config.json";

/// Errors from loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which assessment backend the player picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Nothing chosen yet; starting a game routes through provider setup.
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "cloud")]
    Cloud,
}

impl ProviderKind {
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Unset => "not configured",
            ProviderKind::Local => "local",
            ProviderKind::Cloud => "cloud",
        }
    }
}

/// Values taken from the environment at start-up. Never written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub local_url: Option<String>,
    pub cloud_model: Option<String>,
    pub cloud_api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderKind,

    #[serde(default)]
    pub cloud_api_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_url: Option<String>,

    #[serde(skip)]
    pub env: EnvOverrides,
}

impl Config {
    /// Whether the chosen backend still needs a credential before play.
    pub fn needs_credential(&self) -> bool {
        self.provider == ProviderKind::Cloud && self.effective_api_key().is_empty()
    }

    /// The stored credential, or the environment one when none is stored.
    pub fn effective_api_key(&self) -> &str {
        let stored = self.cloud_api_key.trim();
        if stored.is_empty() {
            self.env.cloud_api_key.as_deref().map(str::trim).unwrap_or("")
        } else {
            stored
        }
    }

    pub fn effective_local_url(&self) -> Option<&str> {
        self.env.local_url.as_deref().or(self.local_url.as_deref())
    }

    pub fn effective_cloud_model(&self) -> Option<&str> {
        self.env.cloud_model.as_deref().or(self.cloud_model.as_deref())
    }

    /// Load from `path`. A missing file yields the default configuration.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to `path` as pretty JSON, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Record environment overrides next to the stored values.
    ///
    /// `LEXICON_LOCAL_URL` and `LEXICON_CLOUD_MODEL` win over the stored
    /// values; `ANTHROPIC_API_KEY` only fills an empty credential. The stored
    /// fields are left untouched so saving never persists them.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        self.env = EnvOverrides {
            local_url: non_empty("LEXICON_LOCAL_URL"),
            cloud_model: non_empty("LEXICON_CLOUD_MODEL"),
            cloud_api_key: non_empty("ANTHROPIC_API_KEY"),
        };
        self
    }
}

/// Where the configuration lives: the user config dir, else the working directory.
pub fn default_config_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join(APP_DIR).join(CONFIG_FILE),
        None => PathBuf::from(format!("{APP_DIR}-{CONFIG_FILE}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.provider, ProviderKind::Unset);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            provider: ProviderKind::Cloud,
            cloud_api_key: "sk-123".to_string(),
            cloud_model: Some("claude-3-haiku".to_string()),
            local_url: None,
            env: EnvOverrides::default(),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["provider"], "");
        assert_eq!(json["cloud_api_key"], "");

        let parsed: Config = serde_json::from_str(r#"{"provider":"local"}"#).unwrap();
        assert_eq!(parsed.provider, ProviderKind::Local);
        assert!(parsed.cloud_api_key.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_needs_credential() {
        let mut config = Config {
            provider: ProviderKind::Cloud,
            ..Config::default()
        };
        assert!(config.needs_credential());
        config.cloud_api_key = "sk".to_string();
        assert!(!config.needs_credential());
        config.provider = ProviderKind::Local;
        config.cloud_api_key.clear();
        assert!(!config.needs_credential());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LEXICON_LOCAL_URL", "http://gpu-box:8080"),
            ("ANTHROPIC_API_KEY", "sk-env"),
        ]);
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let config = Config {
            local_url: Some("http://stored:8080".to_string()),
            ..Config::default()
        }
        .with_overrides(lookup);
        assert_eq!(config.effective_local_url(), Some("http://gpu-box:8080"));
        assert_eq!(config.effective_api_key(), "sk-env");
        assert!(config.effective_cloud_model().is_none());

        let stored = Config {
            cloud_api_key: "sk-stored".to_string(),
            ..Config::default()
        };
        assert_eq!(stored.with_overrides(lookup).effective_api_key(), "sk-stored");
    }

    #[test]
    fn test_env_values_are_not_saved() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LEXICON_LOCAL_URL", "http://gpu-box:8080"),
            ("LEXICON_CLOUD_MODEL", "claude-env-model"),
            ("ANTHROPIC_API_KEY", "sk-from-env-secret"),
        ]);
        let config = Config {
            provider: ProviderKind::Cloud,
            local_url: Some("http://stored:8080".to_string()),
            ..Config::default()
        }
        .with_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert!(!config.needs_credential());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        config.save_to(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("sk-from-env-secret"));
        assert!(!raw.contains("gpu-box"));
        assert!(!raw.contains("claude-env-model"));

        let saved = Config::load_from(&path).unwrap();
        assert!(saved.cloud_api_key.is_empty());
        assert_eq!(saved.local_url.as_deref(), Some("http://stored:8080"));
        assert_eq!(saved.env, EnvOverrides::default());
    }
}
