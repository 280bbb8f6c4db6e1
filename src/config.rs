//! Configuration management for fsnap.
//!
//! Configuration is optional. It is read from an explicit `--config` path or
//! from `~/.config/fsnap/config.toml` when that file exists; otherwise the
//! defaults apply. Nothing here changes the content of a backup file.

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for fsnap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub encode: EncodeConfig,
    pub ui: UIConfig,
}

/// File read and encode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Maximum number of files read at once (0 = unbounded)
    pub max_concurrent_reads: usize,
}

/// User interface configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UIConfig {
    pub color: ColorConfig,
}

/// Color theme configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Theme name: "default", "cyan", "magenta", "green"
    pub theme: String,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_reads: 64,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
        }
    }
}

impl Config {
    /// Returns the default configuration file path, typically
    /// `~/.config/fsnap/config.toml`.
    fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("fsnap")
                .join("config.toml"),
        )
    }

    /// Loads configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// if a file is present there, and the built-in defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fsnap::config::Config;
    ///
    /// # fn main() -> color_eyre::Result<()> {
    /// let config = Config::load(None)?;
    /// println!("Using theme: {}", config.ui.color.theme);
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Loads configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("parsing config file {}", path.display()))?;

        Ok(config)
    }
}
