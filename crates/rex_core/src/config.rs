use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::RexError;

// ---------------------------------------------------------------------------
// Environment overrides
// ---------------------------------------------------------------------------

const ENV_BIND_ADDR: &str = "REX_BIND_ADDR";
const ENV_FILENAME_PREFIX: &str = "REX_FILENAME_PREFIX";
const ENV_MAX_BODY_BYTES: &str = "REX_MAX_BODY_BYTES";
const ENV_LOG_LEVEL: &str = "REX_LOG_LEVEL";

// ---------------------------------------------------------------------------
// RexConfig
// ---------------------------------------------------------------------------

/// Service configuration stored at `~/.rex/config.json`.
///
/// Missing fields fall back to their defaults, so an empty `{}` file is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RexConfig {
    // HTTP
    pub bind_addr: String,
    pub max_body_bytes: usize,

    // Export
    pub filename_prefix: String,
    pub freeze_header_rows: bool,

    // Payload guard
    pub max_depth: usize,

    // General
    pub log_level: String,
}

impl Default for RexConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8787".into(),
            max_body_bytes: 10 * 1024 * 1024,
            filename_prefix: "extracted_data".into(),
            freeze_header_rows: true,
            max_depth: 64,
            log_level: "info".into(),
        }
    }
}

impl RexConfig {
    /// Returns the base config directory: `~/.rex/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".rex"))
    }

    /// Returns the config file path: `~/.rex/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.rex/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Ensures all required directories exist.
    pub fn ensure_dirs() -> Result<()> {
        let dirs = [Self::base_dir()?, Self::logs_dir()?];
        for dir in &dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Loads config from disk (creating a default file if missing), then
    /// applies `REX_*` environment overrides.
    pub fn load() -> Result<Self> {
        Self::ensure_dirs()?;
        let path = Self::config_path()?;
        let mut config = Self::load_from_path(&path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load config from a specific file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self =
                serde_json::from_str(&content).with_context(|| "Failed to parse config.json")?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Reject settings the service cannot start with.
    pub fn validate(&self) -> std::result::Result<(), RexError> {
        let port_ok = self
            .bind_addr
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !port_ok {
            return Err(RexError::Config(format!(
                "bind_addr `{}` must be host:port",
                self.bind_addr
            )));
        }
        if self.max_body_bytes == 0 {
            return Err(RexError::Config("max_body_bytes must be positive".into()));
        }
        if self.max_depth == 0 {
            return Err(RexError::Config("max_depth must be positive".into()));
        }
        if self.filename_prefix.trim().is_empty() {
            return Err(RexError::Config("filename_prefix must not be empty".into()));
        }
        Ok(())
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup(ENV_BIND_ADDR).filter(|v| !v.is_empty()) {
            self.bind_addr = addr;
        }
        if let Some(prefix) = lookup(ENV_FILENAME_PREFIX).filter(|v| !v.is_empty()) {
            self.filename_prefix = prefix;
        }
        if let Some(raw) = lookup(ENV_MAX_BODY_BYTES) {
            match raw.parse() {
                Ok(n) => self.max_body_bytes = n,
                Err(_) => warn!("Ignoring {ENV_MAX_BODY_BYTES}={raw}: not a number"),
            }
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_values() {
        let config = RexConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8787");
        assert_eq!(config.filename_prefix, "extracted_data");
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
        assert!(config.freeze_header_rows);
    }

    #[test]
    fn load_creates_default_file_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let config = RexConfig::load_from_path(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, RexConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"filename_prefix": "rex"}"#).unwrap();
        let config = RexConfig::load_from_path(&path).unwrap();
        assert_eq!(config.filename_prefix, "rex");
        assert_eq!(config.bind_addr, "127.0.0.1:8787");
    }

    #[test]
    fn corrupted_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(RexConfig::load_from_path(&path).is_err());
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let config = RexConfig {
            max_depth: 12,
            ..Default::default()
        };
        config.save_to_path(&path).unwrap();
        assert_eq!(RexConfig::load_from_path(&path).unwrap().max_depth, 12);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("REX_BIND_ADDR", "0.0.0.0:9000"),
            ("REX_MAX_BODY_BYTES", "2048"),
            ("REX_FILENAME_PREFIX", ""),
        ]);
        let mut config = RexConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.max_body_bytes, 2048);
        assert_eq!(config.filename_prefix, "extracted_data");
    }

    #[test]
    fn default_config_is_valid() {
        assert!(RexConfig::default().validate().is_ok());
        let named = RexConfig {
            bind_addr: "localhost:9000".into(),
            ..Default::default()
        };
        assert!(named.validate().is_ok());
    }

    #[test]
    fn invalid_settings_are_config_errors() {
        for config in [
            RexConfig {
                bind_addr: "127.0.0.1".into(),
                ..Default::default()
            },
            RexConfig {
                bind_addr: "0.0.0.0:http".into(),
                ..Default::default()
            },
            RexConfig {
                max_body_bytes: 0,
                ..Default::default()
            },
            RexConfig {
                max_depth: 0,
                ..Default::default()
            },
            RexConfig {
                filename_prefix: " ".into(),
                ..Default::default()
            },
        ] {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, RexError::Config(_)), "{err}");
            assert_eq!(err.status_code(), 500);
        }
    }

    #[test]
    fn bad_numeric_override_is_ignored() {
        let mut config = RexConfig::default();
        config.apply_overrides(|name| (name == "REX_MAX_BODY_BYTES").then(|| "lots".to_string()));
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
    }
}
