//! Configuration module
//!
//! A [`ClientConfig`] is everything the gateway client needs to reach FRG.
//! It is resolved from, in order of precedence: explicit overrides (CLI
//! flags), `FRG_*` environment variables, the config file's environment
//! entry, and the built-in environment profile.

pub mod env;
pub mod file;
pub mod profile;

use anyhow::{bail, Result};
use std::fmt;
use std::path::PathBuf;

use crate::http::DEFAULT_TIMEOUT_SECS;

pub use env::EnvConfig;
pub use file::{ConfigFile, EnvironmentConfig};
pub use profile::{Environment, ProfileManager};

/// Connection settings for one gateway deployment
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Full URL requests are POSTed to
    pub service_endpoint: String,

    /// Shared secret used to sign request bodies
    pub hmac_secret: String,

    /// Sent as the `AUTH` header when set
    pub auth_token: Option<String>,

    /// Sent as the `CSRF` header when set
    pub csrf_token: Option<String>,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(service_endpoint: impl Into<String>, hmac_secret: impl Into<String>) -> Self {
        Self {
            service_endpoint: service_endpoint.into(),
            hmac_secret: hmac_secret.into(),
            auth_token: None,
            csrf_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Check the endpoint is an absolute http(s) URL and the timeout is usable
    pub fn validate(&self) -> std::result::Result<(), String> {
        let url = reqwest::Url::parse(&self.service_endpoint)
            .map_err(|e| format!("invalid service endpoint '{}': {e}", self.service_endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "service endpoint must use http or https, got '{}'",
                url.scheme()
            ));
        }
        if self.timeout_secs == 0 {
            return Err("timeout must be at least 1 second".to_string());
        }
        if self.hmac_secret.is_empty() {
            tracing::warn!("HMAC secret is empty; the gateway will most likely reject requests");
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("service_endpoint", &self.service_endpoint)
            .field("hmac_secret", &mask(&self.hmac_secret))
            .field("auth_token", &self.auth_token.as_deref().map(mask))
            .field("csrf_token", &self.csrf_token.as_deref().map(mask))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Hide all but the last four characters of a secret
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

/// Values given explicitly on the command line
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub environment: Option<String>,
    pub endpoint: Option<String>,
    pub hmac_secret: Option<String>,
    pub auth_token: Option<String>,
    pub csrf_token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub config_file: Option<PathBuf>,
}

/// Load the config file named by overrides or `FRG_CONFIG`, else search the
/// standard locations
pub fn load_config_file(overrides: &ConfigOverrides, env: &EnvConfig) -> Result<ConfigFile> {
    match overrides
        .config_file
        .clone()
        .or_else(|| env.config_file.clone().map(PathBuf::from))
    {
        Some(path) => ConfigFile::load(path),
        None => ConfigFile::load_default(),
    }
}

/// Name of the environment to use
pub fn environment_name(overrides: &ConfigOverrides, env: &EnvConfig, file: &ConfigFile) -> String {
    overrides
        .environment
        .clone()
        .or_else(|| env.environment.clone())
        .or_else(|| file.default_environment.clone())
        .unwrap_or_else(|| Environment::default().name().to_string())
}

/// Resolve a [`ClientConfig`] from all configuration layers
pub fn resolve(
    overrides: &ConfigOverrides,
    env: &EnvConfig,
    file: &ConfigFile,
) -> Result<ClientConfig> {
    let name = environment_name(overrides, env, file);
    let profile = ProfileManager::with_file(file).get(&name);

    let endpoint = overrides
        .endpoint
        .clone()
        .or_else(|| env.endpoint.clone())
        .or_else(|| profile.as_ref().and_then(|p| p.endpoint.clone()));
    let Some(endpoint) = endpoint else {
        if profile.is_none() {
            bail!(
                "Unknown environment '{name}'. Known environments: {}",
                ProfileManager::with_file(file).names().join(", ")
            );
        }
        bail!("No service endpoint configured for environment '{name}'");
    };

    let hmac_secret = overrides
        .hmac_secret
        .clone()
        .or_else(|| env.hmac_secret.clone())
        .or_else(|| profile.as_ref().and_then(|p| p.hmac_secret.clone()));
    let Some(hmac_secret) = hmac_secret else {
        bail!(
            "No HMAC secret configured for environment '{name}'. \
             Pass --secret, set {}_HMAC_SECRET or add hmac_secret to the config file",
            env::ENV_PREFIX
        );
    };

    let config = ClientConfig {
        service_endpoint: endpoint,
        hmac_secret,
        auth_token: overrides
            .auth_token
            .clone()
            .or_else(|| env.auth_token.clone())
            .or_else(|| profile.as_ref().and_then(|p| p.auth_token.clone())),
        csrf_token: overrides
            .csrf_token
            .clone()
            .or_else(|| env.csrf_token.clone())
            .or_else(|| profile.as_ref().and_then(|p| p.csrf_token.clone())),
        timeout_secs: overrides
            .timeout_secs
            .or(env.timeout)
            .unwrap_or(file.timeout_secs),
    };

    if let Err(reason) = config.validate() {
        bail!("Invalid configuration for environment '{name}': {reason}");
    }

    tracing::debug!("Resolved {name} configuration: {config:?}");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_secret() -> EnvConfig {
        EnvConfig {
            hmac_secret: Some("env-secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new("https://frg.example.com/report", "s3cret")
            .with_auth_token("token")
            .with_timeout(5);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.auth_token.as_deref(), Some("token"));
        assert!(config.csrf_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config_validation() {
        assert!(ClientConfig::new("ftp://frg.example.com", "s").validate().is_err());
        assert!(ClientConfig::new("not a url", "s").validate().is_err());
        assert!(ClientConfig::new("http://frg.example.com", "s")
            .with_timeout(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ClientConfig::new("http://frg.example.com", "very-secret-key")
            .with_auth_token("auth-token-1234");
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret-key"));
        assert!(!debug.contains("auth-token-1234"));
        assert!(debug.contains("-key"));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask("abcdefgh"), "****efgh");
    }

    #[test]
    fn test_resolve_builtin_profile() {
        let config = resolve(
            &ConfigOverrides::default(),
            &env_with_secret(),
            &ConfigFile::default(),
        )
        .unwrap();
        assert_eq!(
            config.service_endpoint,
            Environment::Uat.default_endpoint()
        );
        assert_eq!(config.hmac_secret, "env-secret");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_resolve_precedence() {
        let mut file = ConfigFile::default();
        file.environments.push(
            EnvironmentConfig::new("staging")
                .with_endpoint("https://file.example.com/report")
                .with_secret("file-secret"),
        );
        file.timeout_secs = 12;

        let env = EnvConfig {
            environment: Some("staging".to_string()),
            endpoint: Some("https://env.example.com/report".to_string()),
            ..Default::default()
        };

        // env var beats file for the endpoint, file supplies the secret
        let config = resolve(&ConfigOverrides::default(), &env, &file).unwrap();
        assert_eq!(config.service_endpoint, "https://env.example.com/report");
        assert_eq!(config.hmac_secret, "file-secret");
        assert_eq!(config.timeout_secs, 12);

        // flags beat everything
        let overrides = ConfigOverrides {
            endpoint: Some("https://flag.example.com/report".to_string()),
            hmac_secret: Some("flag-secret".to_string()),
            timeout_secs: Some(3),
            ..Default::default()
        };
        let config = resolve(&overrides, &env, &file).unwrap();
        assert_eq!(config.service_endpoint, "https://flag.example.com/report");
        assert_eq!(config.hmac_secret, "flag-secret");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_resolve_requires_secret() {
        let err = resolve(
            &ConfigOverrides::default(),
            &EnvConfig::default(),
            &ConfigFile::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("No HMAC secret"));
    }

    #[test]
    fn test_resolve_unknown_environment() {
        let overrides = ConfigOverrides {
            environment: Some("moon".to_string()),
            ..Default::default()
        };
        let err = resolve(&overrides, &env_with_secret(), &ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("Unknown environment 'moon'"));
    }
}
