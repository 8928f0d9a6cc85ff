use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::engine::OCR_LANGUAGE;
use crate::config::ToolConfig;
use crate::paths;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

/// Environment variable naming an explicit Tesseract executable.
const TESSERACT_PATH_ENV: &str = "TESSERACT_PATH";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

const COMMON_EXECUTABLE_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

const COMMON_TESSDATA_DIRS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    /// `None` lets Tesseract use its compiled-in data path.
    pub tessdata: Option<PathBuf>,
}

/// Locates Tesseract and its English language data, downloading the data if allowed.
pub fn ensure_tesseract(config: &ToolConfig) -> Result<TesseractPaths> {
    let executable = find_tesseract_executable(config)?;
    debug!("Using Tesseract executable: {}", executable.display());

    let tessdata = match find_tessdata_dir(config) {
        Some(dir) => Some(dir),
        None if config.download_tessdata => {
            let cache_dir = paths::get_tessdata_cache_dir();
            download_tessdata(&cache_dir)?;
            Some(cache_dir)
        }
        None => {
            warn!(
                "No {}.traineddata found; relying on Tesseract's default data path",
                OCR_LANGUAGE
            );
            None
        }
    };

    if let Some(dir) = &tessdata {
        info!("Tesseract language data at: {}", dir.display());
    }

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Returns true if `dir` holds the language data file for [`OCR_LANGUAGE`].
pub fn has_language_data(dir: &Path) -> bool {
    dir.join(format!("{OCR_LANGUAGE}.traineddata")).is_file()
}

/// Finds the Tesseract executable: config, environment, PATH, then common locations.
pub fn find_tesseract_executable(config: &ToolConfig) -> Result<PathBuf> {
    if let Some(path) = &config.tesseract_path {
        if path.exists() {
            return Ok(path.clone());
        }
        warn!("Configured tesseract_path {} does not exist", path.display());
    }

    if let Some(path) = std::env::var_os(TESSERACT_PATH_ENV).map(PathBuf::from) {
        if path.exists() {
            return Ok(path);
        }
        warn!("{} points to missing file {}", TESSERACT_PATH_ENV, path.display());
    }

    // Check PATH
    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    COMMON_EXECUTABLE_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| {
            anyhow!(
                "Tesseract not found. Install Tesseract-OCR, add it to PATH, \
                 or set tesseract_path in the config file"
            )
        })
}

/// Finds a directory containing the English language data, if any.
pub fn find_tessdata_dir(config: &ToolConfig) -> Option<PathBuf> {
    if let Some(dir) = &config.tessdata_dir {
        if has_language_data(dir) {
            return Some(dir.clone());
        }
        warn!(
            "Configured tessdata_dir {} has no {}.traineddata",
            dir.display(),
            OCR_LANGUAGE
        );
    }

    let cache_dir = paths::get_tessdata_cache_dir();
    if has_language_data(&cache_dir) {
        return Some(cache_dir);
    }

    // Check TESSDATA_PREFIX environment variable
    if let Some(prefix) = std::env::var_os("TESSDATA_PREFIX").map(PathBuf::from) {
        for dir in [prefix.clone(), prefix.join("tessdata")] {
            if has_language_data(&dir) {
                return Some(dir);
            }
        }
    }

    COMMON_TESSDATA_DIRS
        .iter()
        .map(PathBuf::from)
        .find(|dir| has_language_data(dir))
}

/// Downloads the English trained data into `tessdata_dir`.
fn download_tessdata(tessdata_dir: &Path) -> Result<()> {
    let file_name = format!("{OCR_LANGUAGE}.traineddata");
    let url = format!("{TESSDATA_REPO}/{file_name}");
    let target = tessdata_dir.join(&file_name);

    info!("Downloading {} ...", file_name);

    fs::create_dir_all(tessdata_dir)
        .with_context(|| format!("Failed to create {}", tessdata_dir.display()))?;

    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;

    let response = client
        .get(&url)
        .header("User-Agent", "png-to-csv")
        .send()
        .with_context(|| format!("Failed to download {url}"))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            file_name,
            response.status()
        ));
    }

    let bytes = response.bytes()?;

    // Write under a temporary name so an interrupted download is never picked up
    let partial = tessdata_dir.join(format!("{file_name}.part"));
    fs::write(&partial, &bytes)
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    fs::rename(&partial, &target)
        .with_context(|| format!("Failed to move {} into place", target.display()))?;

    info!("Downloaded {} ({} bytes)", file_name, bytes.len());

    Ok(())
}
