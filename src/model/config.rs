use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub color: ColorMode,
}

/// When to emit ANSI styling on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Color only when stdout is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "sbind=info".to_string(),
            directory: None,
        }
    }
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        match Self::user_config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::defaults(),
        }
    }

    /// Load the embedded defaults, overlaid by `path` if it exists.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Self::defaults();
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn defaults() -> Result<Self> {
        toml::from_str(DEFAULTS).context("failed to parse embedded default config")
    }

    /// Directory for the rolling log file.
    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = self.logging.directory.as_ref() {
            return dir.clone();
        }

        directories::ProjectDirs::from("", "", "sbind")
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("sbind"))
    }

    fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sbind")
            .map(|d| d.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let config = AppConfig::defaults().unwrap();
        assert_eq!(config.output.color, ColorMode::Auto);
        assert_eq!(config.logging.filter, "sbind=info");
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn missing_user_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.output.color, ColorMode::Auto);
    }

    #[test]
    fn partial_user_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output]\ncolor = \"never\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.output.color, ColorMode::Never);
        assert_eq!(config.logging.filter, "sbind=info");
    }

    #[test]
    fn log_directory_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let logs = dir.path().join("logs");
        fs::write(
            &path,
            format!("[logging]\ndirectory = {:?}\n", logs.to_string_lossy()),
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.log_dir(), logs);
    }

    #[test]
    fn unknown_color_mode_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output]\ncolor = \"sometimes\"\n").unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }
}
