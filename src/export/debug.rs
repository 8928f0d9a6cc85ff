//! Debug artifacts for checking OCR quality.
//!
//! Writes the raw OCR text and the parsed rows next to each other so a bad
//! CSV can be traced back to what Tesseract actually read.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::table::Row;

/// Number of rows shown in the console preview.
const PREVIEW_ROWS: usize = 5;

/// Paths of the files written by [`write_debug_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugArtifacts {
    pub ocr_text: PathBuf,
    pub parsed_json: PathBuf,
}

/// Writes `<stem>.ocr.txt` and `<stem>.parsed.json` into `debug_dir`.
///
/// The stem is the input image's file name without extension.
pub fn write_debug_artifacts(
    debug_dir: &Path,
    input: &Path,
    ocr_text: &str,
    rows: &[Row],
) -> Result<DebugArtifacts> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());

    fs::create_dir_all(debug_dir)
        .with_context(|| format!("Failed to create debug directory: {}", debug_dir.display()))?;

    let artifacts = DebugArtifacts {
        ocr_text: debug_dir.join(format!("{stem}.ocr.txt")),
        parsed_json: debug_dir.join(format!("{stem}.parsed.json")),
    };

    fs::write(&artifacts.ocr_text, ocr_text).with_context(|| {
        format!("Failed to write OCR text: {}", artifacts.ocr_text.display())
    })?;

    let json = serde_json::to_string_pretty(rows).context("Failed to serialize parsed rows")?;
    fs::write(&artifacts.parsed_json, json).with_context(|| {
        format!("Failed to write parsed JSON: {}", artifacts.parsed_json.display())
    })?;

    Ok(artifacts)
}

/// One line per row for the first few rows: position, name (or team), points.
pub fn preview_lines(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .take(PREVIEW_ROWS)
        .map(|row| {
            let position = non_empty(row.get("position")).unwrap_or("?");
            let name = non_empty(row.get("driver_name"))
                .or_else(|| non_empty(row.get("team")))
                .unwrap_or("?");
            let points = non_empty(row.get("points")).unwrap_or("-");
            format!("P{position} | {name} | {points} pts")
        })
        .collect()
}

pub fn print_preview(rows: &[Row]) {
    println!("Preview (first {} rows):", PREVIEW_ROWS.min(rows.len()));
    for line in preview_lines(rows) {
        println!("   {line}");
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}
