//! Configuration file storage

use cl_core::config::Config;
use cl_core::error::{LotteryError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_NAME: &str = "config.toml";

/// TOML configuration file at a fixed path
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config directory
    pub fn default_location() -> Self {
        Self::new(Self::default_path())
    }

    /// `<config dir>/config.toml`, or `~/.comment-lottery/config.toml`
    pub fn default_path() -> PathBuf {
        crate::project_dir(|dirs| dirs.config_dir().to_path_buf()).join(FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the configuration; a missing file yields defaults
    pub fn load(&self) -> Result<Config> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {:?}, using defaults", self.path);
                return Ok(Config::default());
            }
            Err(e) => return Err(LotteryError::Io(e)),
        };

        let config: Config = toml::from_str(&content).map_err(|e| {
            LotteryError::Toml(format!("{}: {}", self.path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration (write to temp, then rename)
    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let content =
            toml::to_string_pretty(config).map_err(|e| LotteryError::Toml(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // holds the session cookie
        crate::atomic::write_atomic(&self.path, &self.temp_path(), true, |writer| {
            writer.write_all(content.as_bytes())?;
            Ok(())
        })?;

        debug!("Saved config to {:?}", self.path);
        Ok(())
    }

    /// Load, apply `change`, save; returns the saved configuration
    pub fn patch(&self, change: impl FnOnce(&mut Config)) -> Result<Config> {
        let mut config = self.load()?;
        change(&mut config);
        self.save(&config)?;
        Ok(config)
    }

    /// Remove the file, if any
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LotteryError::Io(e)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(FILE_NAME);
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}
