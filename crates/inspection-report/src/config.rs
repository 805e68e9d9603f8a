//! Configuration management for inspection-report.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name under the user config dir.
const APP_DIR_NAME: &str = "inspection-report";

/// Default output directory for a run.
pub const DEFAULT_OUTPUT_DIR: &str = "typst_report";

/// Default name of the generated markup document.
pub const DEFAULT_REPORT_FILE: &str = "report.typ";

/// Default name of the images subdirectory.
pub const DEFAULT_IMAGES_DIR: &str = "images";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (`INSPREPORT_`, sections split on `__`, e.g.
///    `INSPREPORT_IMAGES__WIDTH_PERCENT=80`)
/// 2. TOML config file at `~/.config/inspection-report/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input configuration.
    pub input: InputConfig,
    /// Output layout configuration.
    pub output: OutputConfig,
    /// Embedded image configuration.
    pub images: ImageConfig,
    /// Markup generation configuration.
    pub markup: MarkupConfig,
}

/// Input-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Project JSON used when no path is given on the command line.
    pub default_path: Option<PathBuf>,
}

/// Output layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the report and its images.
    pub directory: PathBuf,
    /// File name of the generated markup document.
    pub report_file: String,
    /// Name of the images subdirectory, also used in image references.
    pub images_dir: String,
}

/// Embedded image configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Width of each embedded image, as a percentage of the text width.
    pub width_percent: u8,
    /// Number of characters of a faulty photo quoted in diagnostics.
    pub preview_chars: usize,
}

/// Markup generation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Escape Typst markup characters in user-provided text.
    pub escape_text: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            report_file: DEFAULT_REPORT_FILE.to_string(),
            images_dir: DEFAULT_IMAGES_DIR.to_string(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width_percent: 50,
            preview_chars: 50,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("INSPREPORT_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.images.width_percent) {
            return Err(Error::config_validation(format!(
                "width_percent must be between 1 and 100, got {}",
                self.images.width_percent
            )));
        }

        if self.images.preview_chars == 0 {
            return Err(Error::config_validation(
                "preview_chars must be greater than 0",
            ));
        }

        validate_component("report_file", &self.output.report_file)?;
        validate_component("images_dir", &self.output.images_dir)?;

        if self.output.directory.as_os_str().is_empty() {
            return Err(Error::config_validation("output directory must not be empty"));
        }

        Ok(())
    }

    /// Get the path of the markup document inside `output_dir`.
    #[must_use]
    pub fn report_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.output.report_file)
    }

    /// Get the images directory inside `output_dir`.
    #[must_use]
    pub fn images_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.output.images_dir)
    }
}

/// A file or directory name must be a single, non-empty path component.
fn validate_component(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::config_validation(format!("{field} must not be empty")));
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(Error::config_validation(format!(
            "{field} must be a plain name, got {value:?}"
        )));
    }
    Ok(())
}
