//! Tool configuration loaded from png-to-csv.json.
//!
//! Every field is optional. A missing or unreadable file falls back to the
//! defaults with a warning; configuration problems are never fatal.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::paths;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Tesseract executable to use instead of searching for one
    pub tesseract_path: Option<PathBuf>,
    /// Directory containing eng.traineddata
    pub tessdata_dir: Option<PathBuf>,
    /// Fetch eng.traineddata when no local copy is found
    pub download_tessdata: bool,
    /// Where --debug writes OCR text and parsed JSON
    pub debug_dir: Option<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            download_tessdata: true,
            debug_dir: None,
        }
    }
}

impl ToolConfig {
    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Loads `explicit` if given, else png-to-csv.json next to the executable.
    ///
    /// Falls back to defaults when the file is missing or invalid.
    pub fn load(explicit: Option<&Path>) -> Self {
        let config_path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(paths::get_config_path);

        if !config_path.exists() {
            if explicit.is_some() {
                warn!("Config file {} not found. Using defaults.", config_path.display());
            }
            return Self::default();
        }

        match Self::from_file(&config_path) {
            Ok(config) => {
                info!("Config loaded from {}", config_path.display());
                config
            }
            Err(e) => {
                warn!("{:#}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Directory for debug artifacts.
    pub fn debug_dir(&self) -> PathBuf {
        self.debug_dir.clone().unwrap_or_else(paths::get_debug_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert!(config.download_tessdata);
        assert!(config.tesseract_path.is_none());
        assert_eq!(config.debug_dir(), paths::get_debug_dir());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("png-to-csv.json");
        std::fs::write(
            &path,
            r#"{ "tessdata_dir": "/opt/tessdata", "debug_dir": "debug-out" }"#,
        )
        .unwrap();

        let config = ToolConfig::from_file(&path).unwrap();
        assert_eq!(config.tessdata_dir, Some(PathBuf::from("/opt/tessdata")));
        assert_eq!(config.debug_dir(), PathBuf::from("debug-out"));
        assert!(config.download_tessdata);
        assert!(config.tesseract_path.is_none());
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(ToolConfig::from_file(&path).is_err());
        assert_eq!(ToolConfig::load(Some(&path)), ToolConfig::default());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_eq!(ToolConfig::load(Some(&path)), ToolConfig::default());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "download_tessdata": false }"#).unwrap();

        let config = ToolConfig::load(Some(&path));
        assert!(!config.download_tessdata);
    }
}
