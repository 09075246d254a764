//! Environment profiles
//!
//! Built-in gateway deployments plus any extra environments from the config
//! file. Built-in profiles only carry endpoints; secrets always come from
//! the caller's configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::file::{ConfigFile, EnvironmentConfig};

/// Known gateway deployments
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Uat,
    Staging,
    Production,
}

impl Environment {
    pub fn name(&self) -> &'static str {
        match self {
            Environment::Uat => "uat",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Environment::Uat => "http://146.148.110.253:8080/proxy/finance/reporting",
            Environment::Staging => "https://finance-report.picme.lk/proxy/finance/reporting",
            Environment::Production => "https://finance-report.pickme.lk/proxy/finance/reporting",
        }
    }

    pub fn all() -> Vec<Environment> {
        vec![
            Environment::Uat,
            Environment::Staging,
            Environment::Production,
        ]
    }

    pub fn from_str(s: &str) -> Option<Environment> {
        match s.to_lowercase().as_str() {
            "uat" | "test" => Some(Environment::Uat),
            "staging" | "stage" => Some(Environment::Staging),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    /// Built-in profile for this environment
    pub fn profile(&self) -> EnvironmentConfig {
        EnvironmentConfig::new(self.name()).with_endpoint(self.default_endpoint())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookup of environment profiles by name
pub struct ProfileManager {
    profiles: BTreeMap<String, EnvironmentConfig>,
}

impl ProfileManager {
    /// Create a profile manager with the built-in environments
    pub fn new() -> Self {
        let profiles = Environment::all()
            .into_iter()
            .map(|env| (env.name().to_string(), env.profile()))
            .collect();
        Self { profiles }
    }

    /// Built-ins overlaid with the config file's environments
    pub fn with_file(file: &ConfigFile) -> Self {
        let mut manager = Self::new();
        for entry in &file.environments {
            manager.add(entry.clone());
        }
        manager
    }

    /// Add a profile; fields it leaves unset fall back to an existing profile
    /// of the same name
    pub fn add(&mut self, profile: EnvironmentConfig) {
        let key = canonical_name(&profile.name);
        let merged = match self.profiles.remove(&key) {
            Some(existing) => existing.overlay(profile),
            None => profile,
        };
        self.profiles.insert(key, merged);
    }

    /// Get profile by name (aliases such as `prod` are accepted)
    pub fn get(&self, name: &str) -> Option<EnvironmentConfig> {
        self.profiles.get(&canonical_name(name)).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn list(&self) -> Vec<&EnvironmentConfig> {
        self.profiles.values().collect()
    }
}

impl Default for ProfileManager {
    fn default() -> Self {
        Self::new()
    }
}

fn canonical_name(name: &str) -> String {
    Environment::from_str(name)
        .map(|env| env.name().to_string())
        .unwrap_or_else(|| name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let manager = ProfileManager::new();
        assert_eq!(manager.names(), vec!["production", "staging", "uat"]);

        let prod = manager.get("prod").unwrap();
        assert_eq!(
            prod.endpoint.as_deref(),
            Some("https://finance-report.pickme.lk/proxy/finance/reporting")
        );
        assert!(prod.hmac_secret.is_none());
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!(Environment::from_str("STAGE"), Some(Environment::Staging));
        assert_eq!(Environment::from_str("uat"), Some(Environment::Uat));
        assert_eq!(Environment::from_str("dev"), None);
    }

    #[test]
    fn test_file_overlays_builtin() {
        let mut file = ConfigFile::default();
        file.environments
            .push(EnvironmentConfig::new("Staging").with_secret("staging-secret"));
        file.environments.push(
            EnvironmentConfig::new("local").with_endpoint("http://localhost:8080/report"),
        );

        let manager = ProfileManager::with_file(&file);
        let staging = manager.get("staging").unwrap();
        assert_eq!(
            staging.endpoint.as_deref(),
            Some(Environment::Staging.default_endpoint())
        );
        assert_eq!(staging.hmac_secret.as_deref(), Some("staging-secret"));
        assert!(manager.get("local").is_some());
        assert_eq!(manager.list().len(), 4);
    }
}
