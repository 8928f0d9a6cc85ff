use anyhow::{Context, Result, anyhow};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, warn};

use super::setup::TesseractPaths;

/// Recognition language; league tables are English only.
pub const OCR_LANGUAGE: &str = "eng";

/// Page segmentation mode 6: assume a single uniform block of text.
/// Keeps dense, column-aligned table rows from being split into paragraphs.
pub const PAGE_SEGMENTATION_MODE: &str = "6";

/// Builds the Tesseract command line for one image, writing plain text to stdout.
pub fn tesseract_args(input: &Path, tessdata: Option<&Path>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![input.into(), "stdout".into()];
    if let Some(dir) = tessdata {
        args.push("--tessdata-dir".into());
        args.push(dir.into());
    }
    args.extend(["-l", OCR_LANGUAGE, "--psm", PAGE_SEGMENTATION_MODE].map(OsString::from));
    args
}

/// A single recognition run.
///
/// Owns a private working directory for the image handed to Tesseract. The
/// directory is removed when the session is terminated or dropped.
pub struct TesseractSession {
    paths: TesseractPaths,
    workdir: TempDir,
}

impl TesseractSession {
    pub fn start(paths: &TesseractPaths) -> Result<Self> {
        let workdir = tempfile::Builder::new()
            .prefix("png-to-csv-ocr")
            .tempdir()
            .context("Failed to create OCR working directory")?;

        debug!("OCR session started in {}", workdir.path().display());

        Ok(Self {
            paths: paths.clone(),
            workdir,
        })
    }

    /// Runs Tesseract over a PNG-encoded image and returns the recognized text.
    pub fn recognize(&self, png: &[u8]) -> Result<String> {
        let input = self.workdir.path().join("table.png");
        fs::write(&input, png).context("Failed to write image for OCR")?;

        let output = Command::new(&self.paths.executable)
            .args(tesseract_args(&input, self.paths.tessdata.as_deref()))
            .output()
            .with_context(|| {
                format!("Failed to run Tesseract: {}", self.paths.executable.display())
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed ({}): {}", output.status, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Releases the session's working directory.
    pub fn terminate(self) {
        let path = self.workdir.path().to_path_buf();
        if let Err(e) = self.workdir.close() {
            warn!("Failed to clean up OCR directory {}: {}", path.display(), e);
        }
    }
}

/// Recognizes text in a PNG image using a session scoped to this call.
///
/// The session is released whether or not recognition succeeds.
pub fn recognize_text(paths: &TesseractPaths, png: &[u8]) -> Result<String> {
    let session = TesseractSession::start(paths)?;
    let result = session.recognize(png);
    session.terminate();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_tesseract_args_with_tessdata() {
        let args = tesseract_args(Path::new("/tmp/table.png"), Some(Path::new("/data/tessdata")));
        assert_eq!(
            args,
            [
                "/tmp/table.png",
                "stdout",
                "--tessdata-dir",
                "/data/tessdata",
                "-l",
                "eng",
                "--psm",
                "6"
            ]
            .map(OsString::from)
        );
    }

    #[test]
    fn test_tesseract_args_without_tessdata() {
        let args = tesseract_args(Path::new("in.png"), None);
        assert_eq!(
            args,
            ["in.png", "stdout", "-l", "eng", "--psm", "6"].map(OsString::from)
        );
    }

    #[test]
    fn test_session_directory_removed_on_terminate() {
        let paths = TesseractPaths {
            executable: PathBuf::from("tesseract"),
            tessdata: None,
        };
        let session = TesseractSession::start(&paths).unwrap();
        let workdir = session.workdir.path().to_path_buf();
        assert!(workdir.is_dir());

        session.terminate();
        assert!(!workdir.exists());
    }

    #[test]
    fn test_failed_recognition_still_releases_directory() {
        let dir = tempfile::tempdir().unwrap();
        let paths = TesseractPaths {
            executable: dir.path().join("no-such-tesseract"),
            tessdata: None,
        };

        let session = TesseractSession::start(&paths).unwrap();
        let workdir = session.workdir.path().to_path_buf();

        let err = session.recognize(b"not really a png").unwrap_err();
        assert!(err.to_string().contains("Failed to run Tesseract"));

        session.terminate();
        assert!(!workdir.exists());
    }

    #[test]
    fn test_recognize_text_reports_missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let paths = TesseractPaths {
            executable: dir.path().join("no-such-tesseract"),
            tessdata: None,
        };

        assert!(recognize_text(&paths, b"").is_err());
    }
}
