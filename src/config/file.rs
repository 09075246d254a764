//! Configuration file management
//!
//! Handles finding, loading, and validating configuration files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::http::DEFAULT_TIMEOUT_SECS;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./frg-client.yaml",
    "./frg-client.yml",
    "./.frg-client.yaml",
    "~/.config/frg-client/config.yaml",
    "~/.frg-client.yaml",
];

const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Full configuration file structure
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// Environment used when none is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_environment: Option<String>,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment entries; these overlay the built-in profiles by name
    #[serde(default)]
    pub environments: Vec<EnvironmentConfig>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            default_environment: None,
            timeout_secs: default_timeout(),
            environments: Vec::new(),
        }
    }
}

impl ConfigFile {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        tracing::debug!("Loaded config file {}", path.display());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }

        for (i, env) in self.environments.iter().enumerate() {
            if env.name.trim().is_empty() {
                anyhow::bail!("Environment #{} has an empty name", i + 1);
            }
            if let Some(endpoint) = &env.endpoint {
                reqwest::Url::parse(endpoint).with_context(|| {
                    format!("Invalid endpoint for environment '{}': {endpoint}", env.name)
                })?;
            }
            let duplicates = self
                .environments
                .iter()
                .filter(|other| other.name.eq_ignore_ascii_case(&env.name))
                .count();
            if duplicates > 1 {
                anyhow::bail!("Environment '{}' is defined more than once", env.name);
            }
        }

        Ok(())
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            version: default_version(),
            default_environment: Some("uat".to_string()),
            timeout_secs: default_timeout(),
            environments: vec![
                EnvironmentConfig::new("uat").with_secret("change-me"),
                EnvironmentConfig::new("local")
                    .with_endpoint("http://localhost:8080/proxy/finance/reporting")
                    .with_secret("change-me"),
            ],
        }
    }
}

/// Environment-specific configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Environment name (e.g., "uat", "staging", "production")
    pub name: String,

    /// Service endpoint URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

impl EnvironmentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            hmac_secret: None,
            auth_token: None,
            csrf_token: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.hmac_secret = Some(secret.into());
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Fields set on `other` replace ours; the name is kept
    pub fn overlay(self, other: EnvironmentConfig) -> Self {
        Self {
            name: self.name,
            endpoint: other.endpoint.or(self.endpoint),
            hmac_secret: other.hmac_secret.or(self.hmac_secret),
            auth_token: other.auth_token.or(self.auth_token),
            csrf_token: other.csrf_token.or(self.csrf_token),
        }
    }
}

impl std::fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("hmac_secret", &self.hmac_secret.as_deref().map(super::mask))
            .field("auth_token", &self.auth_token.as_deref().map(super::mask))
            .field("csrf_token", &self.csrf_token.as_deref().map(super::mask))
            .finish()
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
