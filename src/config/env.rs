//! Environment variable configuration
//!
//! Provides `FRG_*` environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FRG";

/// Environment configuration from environment variables
#[derive(Clone, Default)]
pub struct EnvConfig {
    /// Environment name from FRG_ENV
    pub environment: Option<String>,
    /// Service endpoint from FRG_ENDPOINT
    pub endpoint: Option<String>,
    /// HMAC secret from FRG_HMAC_SECRET
    pub hmac_secret: Option<String>,
    /// Auth token from FRG_AUTH_TOKEN
    pub auth_token: Option<String>,
    /// CSRF token from FRG_CSRF_TOKEN
    pub csrf_token: Option<String>,
    /// Timeout from FRG_TIMEOUT
    pub timeout: Option<u64>,
    /// Config file from FRG_CONFIG
    pub config_file: Option<String>,
    /// Log level from FRG_LOG_LEVEL
    pub log_level: Option<String>,
    /// Output format from FRG_FORMAT
    pub format: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            environment: get_env("ENV"),
            endpoint: get_env("ENDPOINT"),
            hmac_secret: get_env("HMAC_SECRET"),
            auth_token: get_env("AUTH_TOKEN"),
            csrf_token: get_env("CSRF_TOKEN"),
            timeout: get_env_parse("TIMEOUT"),
            config_file: get_env("CONFIG"),
            log_level: get_env("LOG_LEVEL"),
            format: get_env("FORMAT"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.environment.is_some()
            || self.endpoint.is_some()
            || self.hmac_secret.is_some()
            || self.auth_token.is_some()
            || self.csrf_token.is_some()
            || self.timeout.is_some()
            || self.config_file.is_some()
            || self.log_level.is_some()
            || self.format.is_some()
    }

    /// Print current environment configuration, secrets masked
    pub fn print_summary(&self) {
        let masked = |v: &Option<String>| v.as_deref().map(super::mask);
        println!("Environment Configuration:");
        println!("  {}_ENV:          {:?}", ENV_PREFIX, self.environment);
        println!("  {}_ENDPOINT:     {:?}", ENV_PREFIX, self.endpoint);
        println!("  {}_HMAC_SECRET:  {:?}", ENV_PREFIX, masked(&self.hmac_secret));
        println!("  {}_AUTH_TOKEN:   {:?}", ENV_PREFIX, masked(&self.auth_token));
        println!("  {}_CSRF_TOKEN:   {:?}", ENV_PREFIX, masked(&self.csrf_token));
        println!("  {}_TIMEOUT:      {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_CONFIG:       {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_LOG_LEVEL:    {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_FORMAT:       {:?}", ENV_PREFIX, self.format);
    }
}

impl std::fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvConfig")
            .field("environment", &self.environment)
            .field("endpoint", &self.endpoint)
            .field("hmac_secret", &self.hmac_secret.as_ref().map(|_| "***"))
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("config_file", &self.config_file)
            .field("log_level", &self.log_level)
            .field("format", &self.format)
            .finish()
    }
}

/// Get environment variable with prefix; empty values count as unset
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    fn var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_{name}"), value.into()));
        self
    }

    pub fn environment(self, env: impl Into<String>) -> Self {
        self.var("ENV", env)
    }

    pub fn endpoint(self, endpoint: impl Into<String>) -> Self {
        self.var("ENDPOINT", endpoint)
    }

    pub fn hmac_secret(self, secret: impl Into<String>) -> Self {
        self.var("HMAC_SECRET", secret)
    }

    pub fn timeout(self, timeout: u64) -> Self {
        self.var("TIMEOUT", timeout.to_string())
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        for (key, value) in self.vars {
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all FRG environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_ENV          Environment name (uat, staging, production)");
    println!("  {ENV_PREFIX}_ENDPOINT     Service endpoint URL");
    println!("  {ENV_PREFIX}_HMAC_SECRET  Secret used to sign request bodies");
    println!("  {ENV_PREFIX}_AUTH_TOKEN   Value for the AUTH header");
    println!("  {ENV_PREFIX}_CSRF_TOKEN   Value for the CSRF header");
    println!("  {ENV_PREFIX}_TIMEOUT      Request timeout in seconds");
    println!("  {ENV_PREFIX}_CONFIG       Path to configuration file");
    println!("  {ENV_PREFIX}_LOG_LEVEL    Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_FORMAT       Output format (table, json, json-pretty, csv)");
    println!("  RUST_LOG         Full tracing filter, overrides {ENV_PREFIX}_LOG_LEVEL");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_ENV=staging");
    println!("  export {ENV_PREFIX}_HMAC_SECRET=...");
    println!("  frg-client fetch driver-trip-summary --driver-id 223");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.endpoint.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_builder() {
        let _guard = EnvBuilder::new()
            .endpoint("http://10.0.0.1:8080/report")
            .hmac_secret("from-env")
            .timeout(60)
            .apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(
            config.endpoint.as_deref(),
            Some("http://10.0.0.1:8080/report")
        );
        assert_eq!(config.hmac_secret.as_deref(), Some("from-env"));
        assert_eq!(config.timeout, Some(60));
        assert!(config.has_any());
    }

    #[test]
    fn test_blank_env_is_unset() {
        let _guard = EnvBuilder::new().environment("  ").apply_scoped();
        assert!(EnvConfig::load().environment.is_none());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = EnvConfig {
            hmac_secret: Some("top-secret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("top-secret"));
    }
}
