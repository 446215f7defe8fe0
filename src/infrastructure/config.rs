use crate::domain::{
    config::Bt3Config,
    error::{Bt3Error, Bt3Result},
};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for the per-user configuration file.
    pub fn new() -> Bt3Result<Self> {
        Ok(Self {
            config_path: Self::default_config_path()?,
        })
    }

    /// Create a manager for an explicit configuration file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Load the configuration, falling back to defaults when no file exists.
    pub fn load_config(&self) -> Bt3Result<Bt3Config> {
        if self.config_path.exists() {
            self.load_config_from_path(&self.config_path)
        } else {
            Ok(Bt3Config::default())
        }
    }

    /// Write a default configuration file. Fails if one already exists.
    pub fn init_config(&self) -> Bt3Result<()> {
        if self.config_path.exists() {
            return Err(Bt3Error::Config {
                message: format!(
                    "Configuration already exists at {}",
                    self.config_path.display()
                ),
            });
        }

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Bt3Error::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        self.save_config_to_path(&self.config_path, &Bt3Config::default())
    }

    /// Per-user configuration path
    fn default_config_path() -> Bt3Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| Bt3Error::Config {
            message: "Could not determine config directory".to_string(),
        })?;

        Ok(config_dir.join("bt3").join("config.toml"))
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> Bt3Result<Bt3Config> {
        let content = fs::read_to_string(path).map_err(|e| Bt3Error::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| Bt3Error::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &Bt3Config) -> Bt3Result<()> {
        let content = toml::to_string_pretty(config).map_err(|e| Bt3Error::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| Bt3Error::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::framing::ChecksumMode;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("absent.toml"));

        let config = manager.load_config().unwrap();
        assert_eq!(config.global.log_level, "info");
        assert_eq!(config.serial.baud_rate, 38400);
    }

    #[test]
    fn test_init_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(&path);

        manager.init_config().unwrap();
        assert!(path.exists());
        assert!(manager.init_config().is_err());

        let config = manager.load_config().unwrap();
        assert_eq!(config.terminal.checksum, ChecksumMode::Modulo);
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "[serial\nbaud_rate = ").unwrap();

        let manager = ConfigManager::with_path(&path);
        let error = manager.load_config().unwrap_err();
        assert!(error.to_string().contains("broken.toml"));
    }
}
