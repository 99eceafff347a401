//! Configuration file handling
//!
//! The gs configuration is a TOML document holding the configured aliases,
//! stored at ~/.config/gs/config.toml or under $GS_CONFIG_DIR when that
//! variable is set. The document carries a schema version so future layout
//! changes can migrate old files in place.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::alias::Alias;
use crate::error::{Error, Result};

/// Schema version written to new config files. Bump only together with a
/// migration step in `migrate`.
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "GS_CONFIG_DIR";

/// On-disk configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Configured gateway aliases
    #[serde(default)]
    pub aliases: Vec<Alias>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            aliases: Vec::new(),
        }
    }
}

/// Loads and saves the configuration document
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Resolve the config path, honoring $GS_CONFIG_DIR so tests and
    /// scripts can isolate their configuration.
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("gs"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Use an explicit path instead of the default location
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Read the config, migrating older schema versions in place.
    ///
    /// A missing file is an empty default, not an error.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content)?;

        match config.schema_version {
            v if v < SCHEMA_VERSION => self.migrate(config),
            v if v > SCHEMA_VERSION => Err(Error::Config(format!(
                "Configuration file version {v} is newer than supported version {SCHEMA_VERSION}. Please upgrade gs."
            ))),
            _ => Ok(config),
        }
    }

    /// Write the config, creating parent directories as needed.
    ///
    /// The file holds credentials, so permissions are clamped to 0600.
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.config_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn migrate(&self, mut config: Config) -> Result<Config> {
        // No historic versions yet; stamp the current version.
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("config.toml"));
        (manager, temp_dir)
    }

    #[test]
    fn test_missing_file_loads_default() {
        let (manager, _temp_dir) = temp_manager();
        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (manager, _temp_dir) = temp_manager();

        let mut config = Config::default();
        let mut alias = Alias::new("test", "http://localhost:8081");
        alias.username = Some("admin".to_string());
        alias.password = Some("secret".to_string());
        alias.workers = 12;
        config.aliases.push(alias);

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded.aliases.len(), 1);
        assert_eq!(loaded.aliases[0].name, "test");
        assert_eq!(loaded.aliases[0].workers, 12);
        assert!(loaded.aliases[0].access_key.is_none());
    }

    #[test]
    fn test_newer_schema_version_is_rejected() {
        let (manager, _temp_dir) = temp_manager();
        let content = format!("schema_version = {}\n", SCHEMA_VERSION + 1);
        std::fs::write(manager.config_path(), content).unwrap();

        let err = manager.load().unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_older_schema_version_is_migrated() {
        let (manager, _temp_dir) = temp_manager();
        std::fs::write(manager.config_path(), "schema_version = 0\n").unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_clamps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (manager, _temp_dir) = temp_manager();
        manager.save(&Config::default()).unwrap();

        let mode = std::fs::metadata(manager.config_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
