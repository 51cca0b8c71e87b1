use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use serde::Deserialize;

use crate::clock::DEFAULT_REFRESH_HZ;

pub const MAX_REFRESH_HZ: u32 = 240;
pub const LOG_ENV_VAR: &str = "ASCIIPLAY_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPreference {
    /// Colour when the frames carry it and NO_COLOR is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorPreference {
    pub fn resolve(self, frames_are_colored: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => frames_are_colored && std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerConfig {
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: u32,
    #[serde(default)]
    pub color: ColorPreference,
    #[serde(default = "default_true")]
    pub watch: bool,
    #[serde(default)]
    pub start_paused: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_refresh_hz() -> u32 {
    DEFAULT_REFRESH_HZ
}

fn default_true() -> bool {
    true
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            refresh_hz: default_refresh_hz(),
            color: ColorPreference::default(),
            watch: true,
            start_paused: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.refresh_hz == 0 || self.refresh_hz > MAX_REFRESH_HZ {
            bail!(
                "refresh_hz must be in 1..={}, got {}",
                MAX_REFRESH_HZ,
                self.refresh_hz
            );
        }
        if self.logging.level.trim().is_empty() {
            bail!("logging.level cannot be empty");
        }
        Ok(())
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub refresh_hz: Option<u32>,
    pub color: Option<ColorPreference>,
    pub watch: Option<bool>,
    pub start_paused: Option<bool>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut PlayerConfig) {
        if let Some(refresh_hz) = self.refresh_hz {
            config.refresh_hz = refresh_hz;
        }
        if let Some(color) = self.color {
            config.color = color;
        }
        if let Some(watch) = self.watch {
            config.watch = watch;
        }
        if let Some(start_paused) = self.start_paused {
            config.start_paused = start_paused;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(file) = self.log_file {
            config.logging.file = Some(file);
        }
    }
}

pub fn load_config(path: &Path) -> Result<PlayerConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|error| anyhow!("failed to read config {}: {}", path.display(), error))?;
    let config: PlayerConfig = serde_yaml::from_str(&contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        anyhow!(
            "failed to parse yaml in {} at {}: {}",
            path.display(),
            location,
            error
        )
    })?;
    config
        .validate()
        .map_err(|error| anyhow!("invalid config {}: {error}", path.display()))?;
    Ok(config)
}

/// File (if any), then overrides, then validation.
pub fn resolve_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<PlayerConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => PlayerConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}
