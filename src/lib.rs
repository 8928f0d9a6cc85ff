//! PNG → CSV migration tool
//!
//! Converts screenshots of league race results and standings tables into
//! CSV files via Tesseract OCR and line-based heuristics. The CSV is meant
//! to be reviewed by hand before it is published.

pub mod cli;
pub mod config;
pub mod export;
pub mod ocr;
pub mod paths;
pub mod pipeline;
pub mod table;
