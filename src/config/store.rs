use super::settings::Settings;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SettingsStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Source of settings, read once per command
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync {
    /// Current settings; storage problems degrade to defaults
    fn load(&self) -> Settings;

    fn set_gap_size(&self, gap_size: u32) -> Result<(), SettingsStoreError>;
}

/// Settings held in memory, used by tests and simulations
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    settings: RwLock<Settings>,
}

impl InMemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self) -> Settings {
        self.settings.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_gap_size(&self, gap_size: u32) -> Result<(), SettingsStoreError> {
        self.settings.write().unwrap_or_else(PoisonError::into_inner).gap_size = gap_size;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    pub config_dir: PathBuf,
    pub file_name: String,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snaptile");

        Self {
            config_dir,
            file_name: "settings.toml".to_string(),
        }
    }
}

/// Settings persisted as TOML in the user's configuration directory
pub struct FileSettingsStore {
    config: FileStoreConfig,
}

impl FileSettingsStore {
    pub fn new(config: FileStoreConfig) -> Self {
        Self { config }
    }

    /// Store reading an explicit settings file
    pub fn at_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let config_dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "settings.toml".to_string());

        Self::new(FileStoreConfig {
            config_dir,
            file_name,
        })
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config.config_dir.join(&self.config.file_name)
    }

    /// Create the configuration directory and a default settings file if missing
    pub fn initialize(&self) -> Result<PathBuf, SettingsStoreError> {
        if !self.config.config_dir.exists() {
            fs::create_dir_all(&self.config.config_dir)?;
        }

        let path = self.settings_path();
        if !path.exists() {
            self.save(&Settings::default())?;
        }

        Ok(path)
    }

    /// Read the settings file. A missing file yields defaults.
    pub fn read(&self) -> Result<Settings, SettingsStoreError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsStoreError> {
        if !self.config.config_dir.exists() {
            fs::create_dir_all(&self.config.config_dir)?;
        }

        let file_path = self.settings_path();
        let content = toml::to_string_pretty(settings)?;

        // Atomic write
        let temp_path = file_path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(temp_path, file_path)?;

        debug!(path = %self.settings_path().display(), "Saved settings");
        Ok(())
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new(FileStoreConfig::default())
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        match self.read() {
            Ok(settings) => settings,
            Err(err) => {
                warn!(
                    path = %self.settings_path().display(),
                    error = %err,
                    "Failed to read settings, using defaults"
                );
                Settings::default()
            }
        }
    }

    fn set_gap_size(&self, gap_size: u32) -> Result<(), SettingsStoreError> {
        let mut settings = self.read()?;
        settings.gap_size = gap_size;
        self.save(&settings)
    }
}
