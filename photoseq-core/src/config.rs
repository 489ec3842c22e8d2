use crate::convert::{validate_quality, TargetFormat, DEFAULT_QUALITY};
use crate::error::PhotoseqError;
use crate::preview::DEFAULT_PREVIEW_LIMIT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding the photos to number, order and convert
    #[serde(default = "default_photos_dir")]
    pub photos_dir: PathBuf,

    /// Where converted files are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Order manifest read by `order`
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Conversion quality, 0-100
    #[serde(default = "default_quality")]
    pub quality: i64,

    #[serde(default)]
    pub format: TargetFormat,

    /// Default preview format: "list", "table", or "none"
    #[serde(default = "default_preview")]
    pub preview_format: String,

    /// Number of planned items shown before eliding the rest
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,

    /// Whether to use color output by default (None = auto-detect)
    #[serde(default)]
    pub use_color: Option<bool>,

    /// Write an apply journal into this directory (None = no journal)
    #[serde(default)]
    pub journal_dir: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            photos_dir: default_photos_dir(),
            output_dir: default_output_dir(),
            manifest: default_manifest(),
            quality: default_quality(),
            format: TargetFormat::default(),
            preview_format: default_preview(),
            preview_limit: default_preview_limit(),
            use_color: None,
            journal_dir: None,
        }
    }
}

fn default_photos_dir() -> PathBuf {
    PathBuf::from("./photos")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./photos_webp")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("order.json")
}

fn default_quality() -> i64 {
    i64::from(DEFAULT_QUALITY)
}

fn default_preview() -> String {
    "list".to_string()
}

fn default_preview_limit() -> usize {
    DEFAULT_PREVIEW_LIMIT
}

impl Config {
    /// Load config from .photoseq/config.toml in the current directory, then
    /// from the user config directory
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Self::load_from_dir(&cwd)
    }

    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let local = dir.join(".photoseq").join("config.toml");
        if local.exists() {
            return Self::load_from_path(&local);
        }

        if let Some(global) = global_config_path() {
            if global.exists() {
                return Self::load_from_path(&global);
            }
        }

        // Return default config if no config file exists
        Ok(Self::default())
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.defaults.quality()?;
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

impl DefaultsConfig {
    pub fn quality(&self) -> Result<u8, PhotoseqError> {
        validate_quality(self.quality)
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("photoseq").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.photos_dir, PathBuf::from("./photos"));
        assert_eq!(config.defaults.output_dir, PathBuf::from("./photos_webp"));
        assert_eq!(config.defaults.manifest, PathBuf::from("order.json"));
        assert_eq!(config.defaults.quality().unwrap(), 85);
        assert_eq!(config.defaults.format, TargetFormat::Webp);
        assert_eq!(config.defaults.preview_format, "list");
        assert_eq!(config.defaults.preview_limit, 10);
        assert_eq!(config.defaults.use_color, None);
        assert_eq!(config.defaults.journal_dir, None);
    }

    #[test]
    fn test_load_save_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.defaults.preview_format = "table".to_string();
        config.defaults.quality = 60;
        config.defaults.format = TargetFormat::Jpeg;
        config.defaults.use_color = Some(true);

        config.save_to_path(&config_path).unwrap();

        let loaded_config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded_config.defaults.preview_format, "table");
        assert_eq!(loaded_config.defaults.quality().unwrap(), 60);
        assert_eq!(loaded_config.defaults.format, TargetFormat::Jpeg);
        assert_eq!(loaded_config.defaults.use_color, Some(true));
    }

    #[test]
    fn test_partial_config() {
        let toml_content = r#"
[defaults]
format = "jpeg"
preview_limit = 3
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.defaults.format, TargetFormat::Jpeg);
        assert_eq!(config.defaults.preview_limit, 3);
        // Other fields should have their defaults
        assert_eq!(config.defaults.quality, 85);
        assert_eq!(config.defaults.photos_dir, PathBuf::from("./photos"));
    }

    #[test]
    fn test_invalid_quality_rejected_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[defaults]\nquality = 150\n").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(
            PhotoseqError::find(&err),
            Some(PhotoseqError::InvalidQuality(150))
        ));
    }

    #[test]
    fn test_local_config_wins() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(".photoseq").join("config.toml");
        fs::create_dir_all(local.parent().unwrap()).unwrap();
        fs::write(&local, "[defaults]\nphotos_dir = \"pics\"\n").unwrap();

        let config = Config::load_from_dir(temp_dir.path()).unwrap();
        assert_eq!(config.defaults.photos_dir, PathBuf::from("pics"));
    }
}
