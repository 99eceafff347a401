//! Alias management
//!
//! Aliases are named references to GridStore web gateway endpoints,
//! including connection details, credentials and scan worker defaults.

use serde::{Deserialize, Serialize};

use crate::config::ConfigManager;
use crate::error::{Error, Result};

/// Connection timeouts for an alias, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "TimeoutConfig::default_connect_ms")]
    pub connect_ms: u64,

    #[serde(default = "TimeoutConfig::default_read_ms")]
    pub read_ms: u64,
}

impl TimeoutConfig {
    fn default_connect_ms() -> u64 {
        5000
    }

    fn default_read_ms() -> u64 {
        30000
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: Self::default_connect_ms(),
            read_ms: Self::default_read_ms(),
        }
    }
}

/// An alias represents a named GridStore web gateway endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alias {
    /// Unique name for this alias
    pub name: String,

    /// Web gateway URL
    pub endpoint: String,

    /// Username for basic authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for basic authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Session access key, sent as a header instead of basic auth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    /// Allow insecure TLS connections
    #[serde(default)]
    pub insecure: bool,

    /// Default worker count for ingestion
    #[serde(default = "Alias::default_workers")]
    pub workers: u32,

    /// Default worker count for parallel scans (capped at 8 when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_workers: Option<u32>,

    /// Timeout configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<TimeoutConfig>,
}

impl Alias {
    fn default_workers() -> u32 {
        8
    }

    /// Create a new alias with required fields
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            username: None,
            password: None,
            access_key: None,
            insecure: false,
            workers: Self::default_workers(),
            query_workers: None,
            timeout: None,
        }
    }

    /// Validate the alias fields before saving
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Config("Alias name cannot be empty".into()));
        }
        url::Url::parse(&self.endpoint)?;
        Ok(())
    }

    /// Effective worker count for parallel scans
    pub fn scan_workers(&self) -> u32 {
        self.query_workers
            .unwrap_or_else(|| self.workers.min(8))
            .max(1)
    }

    /// Effective timeouts, falling back to the defaults when unset
    pub fn timeout_config(&self) -> TimeoutConfig {
        self.timeout.clone().unwrap_or_default()
    }
}

/// Alias CRUD over the configuration file
pub struct AliasManager {
    config_manager: ConfigManager,
}

impl AliasManager {
    /// Wrap a specific ConfigManager, mainly for tests
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Open the default config location
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_manager: ConfigManager::new()?,
        })
    }

    /// All configured aliases, in config-file order
    pub fn list(&self) -> Result<Vec<Alias>> {
        Ok(self.config_manager.load()?.aliases)
    }

    /// Look up an alias by name
    pub fn get(&self, name: &str) -> Result<Alias> {
        self.config_manager
            .load()?
            .aliases
            .into_iter()
            .find(|a| a.name == name)
            .ok_or_else(|| Error::AliasNotFound(name.to_string()))
    }

    /// Add an alias, replacing any existing one with the same name in place
    pub fn set(&self, alias: Alias) -> Result<()> {
        let mut config = self.config_manager.load()?;
        match config.aliases.iter().position(|a| a.name == alias.name) {
            Some(idx) => config.aliases[idx] = alias,
            None => config.aliases.push(alias),
        }
        self.config_manager.save(&config)
    }

    /// Remove an alias by name
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        match config.aliases.iter().position(|a| a.name == name) {
            Some(idx) => {
                config.aliases.remove(idx);
                self.config_manager.save(&config)
            }
            None => Err(Error::AliasNotFound(name.to_string())),
        }
    }

    /// Whether an alias with this name is configured
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.config_manager.load()?.aliases.iter().any(|a| a.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_alias_manager() -> (AliasManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_manager = ConfigManager::with_path(config_path);
        let alias_manager = AliasManager::with_config_manager(config_manager);
        (alias_manager, temp_dir)
    }

    #[test]
    fn test_alias_new() {
        let alias = Alias::new("test", "http://localhost:8081");
        assert_eq!(alias.name, "test");
        assert_eq!(alias.endpoint, "http://localhost:8081");
        assert_eq!(alias.workers, 8);
        assert!(alias.username.is_none());
        assert!(!alias.insecure);
    }

    #[test]
    fn test_alias_validate() {
        assert!(Alias::new("test", "http://localhost:8081").validate().is_ok());
        assert!(Alias::new("test", "not a url").validate().is_err());
        assert!(Alias::new("", "http://localhost:8081").validate().is_err());
    }

    #[test]
    fn test_scan_workers_capped_when_unset() {
        let mut alias = Alias::new("test", "http://localhost:8081");
        alias.workers = 32;
        assert_eq!(alias.scan_workers(), 8);

        alias.workers = 4;
        assert_eq!(alias.scan_workers(), 4);

        alias.query_workers = Some(16);
        assert_eq!(alias.scan_workers(), 16);

        alias.query_workers = Some(0);
        assert_eq!(alias.scan_workers(), 1);
    }

    #[test]
    fn test_alias_manager_set_and_get() {
        let (manager, _temp_dir) = temp_alias_manager();

        let mut alias = Alias::new("mygrid", "http://localhost:8081");
        alias.username = Some("admin".into());
        manager.set(alias).unwrap();

        let retrieved = manager.get("mygrid").unwrap();
        assert_eq!(retrieved.name, "mygrid");
        assert_eq!(retrieved.endpoint, "http://localhost:8081");
        assert_eq!(retrieved.username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_alias_manager_list() {
        let (manager, _temp_dir) = temp_alias_manager();

        manager.set(Alias::new("a", "http://a:8081")).unwrap();
        manager.set(Alias::new("b", "http://b:8081")).unwrap();

        let aliases = manager.list().unwrap();
        assert_eq!(aliases.len(), 2);
    }

    #[test]
    fn test_alias_manager_remove() {
        let (manager, _temp_dir) = temp_alias_manager();

        manager.set(Alias::new("test", "http://localhost:8081")).unwrap();
        assert!(manager.exists("test").unwrap());

        manager.remove("test").unwrap();
        assert!(!manager.exists("test").unwrap());
    }

    #[test]
    fn test_alias_manager_remove_not_found() {
        let (manager, _temp_dir) = temp_alias_manager();

        let result = manager.remove("nonexistent");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::AliasNotFound(_)));
    }

    #[test]
    fn test_alias_manager_get_not_found() {
        let (manager, _temp_dir) = temp_alias_manager();

        let result = manager.get("nonexistent");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::AliasNotFound(_)));
    }

    #[test]
    fn test_alias_update_existing() {
        let (manager, _temp_dir) = temp_alias_manager();

        manager.set(Alias::new("test", "http://old:8081")).unwrap();
        manager.set(Alias::new("test", "http://new:8081")).unwrap();

        let aliases = manager.list().unwrap();
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].endpoint, "http://new:8081");
    }
}
