//! StudyGate Configuration Module
//! Handles loading and validating studygate.config.json

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::rbac::{ClaimKeys, UnownedResourcePolicy};

pub const CONFIG_FILE: &str = "studygate.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Invalid config format: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub claims: ClaimKeys,
    #[serde(default)]
    pub enforcement: EnforcementConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Outcome for resources exposing neither an owner nor a creator
    #[serde(default)]
    pub unowned_resource: UnownedResourcePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Relative paths resolve against the config directory
    #[serde(default = "default_audit_dir")]
    pub dir: PathBuf,
}

fn default_port() -> u16 {
    54330
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_audit_dir() -> PathBuf {
    PathBuf::from("audit")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_audit_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            claims: ClaimKeys::default(),
            enforcement: EnforcementConfig::default(),
            api: ApiConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl Config {
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(ConfigError::NotFound(config_path));
        }
        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load the config, falling back to defaults when no file exists
    pub fn load_or_default(config_dir: &Path) -> Result<Self, ConfigError> {
        match Self::load(config_dir) {
            Err(ConfigError::NotFound(path)) => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn audit_dir(&self, config_dir: &Path) -> PathBuf {
        if self.audit.dir.is_absolute() {
            self.audit.dir.clone()
        } else {
            config_dir.join(&self.audit.dir)
        }
    }
}
