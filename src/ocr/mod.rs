pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::{TesseractSession, recognize_text};
pub use preprocess::preprocess_image;
pub use setup::{TesseractPaths, ensure_tesseract};

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::config::ToolConfig;

/// High-level function: table screenshot → raw OCR text.
///
/// Preprocesses the image, locates Tesseract, and runs one recognition session.
pub fn ocr_table_image(path: &Path, config: &ToolConfig) -> Result<String> {
    info!("Preprocessing image...");
    let png = preprocess_image(path).context("Image preprocessing failed")?;

    info!("Running OCR (this may take a moment)...");
    let tesseract = ensure_tesseract(config).context("Tesseract setup failed")?;
    let text = recognize_text(&tesseract, &png).context("Text recognition failed")?;

    info!("OCR extracted {} lines", text.lines().count());
    Ok(text)
}
