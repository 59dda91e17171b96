//! Configuration management for ticketq.
//!
//! Settings live in per-adapter JSON documents plus one main document:
//!
//! - **macOS/Linux**: `~/.config/ticketq/<adapter>.json`, `~/.config/ticketq/config.json`
//! - **Windows**: `%APPDATA%\ticketq\...`
//!
//! Secrets never land in these files; they belong in the credential vault.
//! Writes are atomic (temp file + rename in the same directory), so a crash
//! mid-write cannot leave a half-written document behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::adapter::ConfigField;
use crate::error::{Error, Result};

/// Main config file name.
const MAIN_CONFIG_FILE: &str = "config.json";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "ticketq";

/// Non-secret settings for one adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    /// Backend name this configuration belongs to
    pub adapter: String,
    /// Backend-specific key/value settings
    pub settings: Map<String, Value>,
}

impl AdapterConfig {
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            settings: Map::new(),
        }
    }

    /// Set a string setting, consuming and returning self for chaining.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.settings
            .insert(key.to_string(), Value::String(value.into()));
        self
    }

    /// Get a string setting.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(Value::as_str)
    }

    /// Get a required string setting, erroring with the missing field name.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key).ok_or_else(|| Error::Config {
            message: format!(
                "Missing required field '{}' for adapter '{}'",
                key, self.adapter
            ),
            path: None,
        })
    }
}

/// Main ticketq configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MainConfig {
    /// Adapter used when none is named explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_adapter: Option<String>,
}

/// Durable store for adapter configurations.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Create a store rooted at the platform config directory.
    pub fn new() -> Result<Self> {
        let dir = dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config {
                message: "Could not determine config directory".to_string(),
                path: None,
            })?;
        Ok(Self { dir })
    }

    /// Create a store rooted at a custom directory. Used by tests and the
    /// CLI's `--config-path` override.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn adapter_path(&self, adapter: &str) -> PathBuf {
        self.dir.join(format!("{}.json", adapter))
    }

    fn main_path(&self) -> PathBuf {
        self.dir.join(MAIN_CONFIG_FILE)
    }

    /// Create the config directory on first use, owner-only on Unix.
    fn ensure_dir(&self) -> Result<()> {
        if self.dir.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir).map_err(|e| Error::Config {
            message: format!("Failed to create config directory: {}", e),
            path: Some(self.dir.clone()),
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700)).map_err(|e| {
                Error::Config {
                    message: format!("Failed to restrict config directory permissions: {}", e),
                    path: Some(self.dir.clone()),
                }
            })?;
        }
        Ok(())
    }

    /// Write a document atomically: temp file in the same directory, sync,
    /// rename over the target.
    fn atomic_write(&self, path: &Path, contents: &str) -> Result<()> {
        self.ensure_dir()?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("config");
        let temp_path = self.dir.join(format!(".{}.tmp", file_name));

        {
            let mut file = fs::File::create(&temp_path).map_err(|e| Error::Config {
                message: format!("Failed to write config: {}", e),
                path: Some(temp_path.clone()),
            })?;
            file.write_all(contents.as_bytes())
                .map_err(|e| Error::Config {
                    message: format!("Failed to write config: {}", e),
                    path: Some(temp_path.clone()),
                })?;
            file.sync_all().map_err(|e| Error::Config {
                message: format!("Failed to sync config: {}", e),
                path: Some(temp_path.clone()),
            })?;
        }

        fs::rename(&temp_path, path).map_err(|e| Error::Config {
            message: format!("Failed to rename config into place: {}", e),
            path: Some(path.to_path_buf()),
        })?;

        Ok(())
    }

    /// Load the main configuration, defaulting when the file is absent.
    pub fn load_main(&self) -> Result<MainConfig> {
        let path = self.main_path();
        if !path.exists() {
            debug!(path = ?path, "Main config does not exist, using defaults");
            return Ok(MainConfig::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| Error::Config {
            message: format!("Failed to read main config: {}", e),
            path: Some(path.clone()),
        })?;

        serde_json::from_str(&contents).map_err(|e| Error::Config {
            message: format!("Invalid JSON in main config: {}", e),
            path: Some(path),
        })
    }

    /// Save the main configuration.
    pub fn save_main(&self, config: &MainConfig) -> Result<()> {
        let contents = serde_json::to_string_pretty(config).map_err(|e| Error::Config {
            message: format!("Failed to serialize main config: {}", e),
            path: None,
        })?;
        self.atomic_write(&self.main_path(), &contents)?;
        debug!("Saved main configuration");
        Ok(())
    }

    /// Load an adapter's configuration.
    ///
    /// Returns `Ok(None)` when no file exists. A file that exists but does
    /// not parse is an error carrying the file path, never treated as absent.
    pub fn load(&self, adapter: &str) -> Result<Option<AdapterConfig>> {
        let path = self.adapter_path(adapter);
        if !path.exists() {
            debug!(adapter = adapter, "No config file");
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(|e| Error::Config {
            message: format!("Failed to read config for '{}': {}", adapter, e),
            path: Some(path.clone()),
        })?;

        let settings: Map<String, Value> =
            serde_json::from_str(&contents).map_err(|e| Error::Config {
                message: format!("Invalid JSON in config for '{}': {}", adapter, e),
                path: Some(path),
            })?;

        debug!(adapter = adapter, "Loaded configuration");
        Ok(Some(AdapterConfig {
            adapter: adapter.to_string(),
            settings,
        }))
    }

    /// Save an adapter's configuration.
    ///
    /// Any field the schema marks secret is rejected with `SchemaViolation`
    /// before anything touches disk.
    pub fn save(
        &self,
        adapter: &str,
        config: &AdapterConfig,
        schema: &[ConfigField],
    ) -> Result<()> {
        for field in schema.iter().filter(|f| f.secret) {
            if config.settings.contains_key(field.name) {
                return Err(Error::SchemaViolation {
                    adapter: adapter.to_string(),
                    field: field.name.to_string(),
                });
            }
        }

        let contents =
            serde_json::to_string_pretty(&config.settings).map_err(|e| Error::Config {
                message: format!("Failed to serialize config for '{}': {}", adapter, e),
                path: None,
            })?;
        self.atomic_write(&self.adapter_path(adapter), &contents)?;
        debug!(adapter = adapter, "Saved configuration");
        Ok(())
    }

    /// Delete an adapter's configuration file.
    ///
    /// Returns `true` if a file was removed.
    pub fn delete(&self, adapter: &str) -> Result<bool> {
        let path = self.adapter_path(adapter);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| Error::Config {
            message: format!("Failed to delete config for '{}': {}", adapter, e),
            path: Some(path),
        })?;
        Ok(true)
    }

    /// Adapters that have a configuration file, sorted by name.
    pub fn list_configured(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut adapters: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_str()?.to_string();
                let stem = name.strip_suffix(".json")?;
                if name == MAIN_CONFIG_FILE || name.starts_with('.') {
                    return None;
                }
                Some(stem.to_string())
            })
            .collect();
        adapters.sort();
        adapters
    }

    /// Set the default adapter in the main configuration.
    pub fn set_default_adapter(&self, adapter: &str) -> Result<()> {
        let mut main = self.load_main()?;
        main.default_adapter = Some(adapter.to_string());
        self.save_main(&main)
    }

    /// The configured default adapter, if any.
    pub fn default_adapter(&self) -> Result<Option<String>> {
        Ok(self.load_main()?.default_adapter)
    }
}
