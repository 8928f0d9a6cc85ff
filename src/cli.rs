//! Command-line arguments and their validation.

use clap::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::table::TableType;

#[derive(Parser, Debug)]
#[command(name = "png-to-csv")]
#[command(about = "Convert a results or standings table screenshot to CSV via OCR")]
pub struct Args {
    /// Kind of table shown in the image
    #[arg(long = "type", value_enum)]
    pub table_type: TableType,

    /// Source screenshot
    #[arg(long)]
    pub input: PathBuf,

    /// Destination CSV file
    #[arg(long)]
    pub output: PathBuf,

    /// Event identifier written into every row (required for --type race)
    #[arg(long = "event_id", visible_alias = "event-id")]
    pub event_id: Option<String>,

    /// Also write raw OCR text and parsed rows to the debug directory
    #[arg(long)]
    pub debug: bool,

    /// Config file (default: png-to-csv.json next to the executable)
    #[arg(long, env = "PNG_TO_CSV_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("--event_id is required for --type race")]
    MissingEventId,

    #[error("Failed to resolve path {}: {source}", path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub table_type: TableType,
    /// Empty unless given; always present for race tables.
    pub event_id: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub debug: bool,
    pub config: Option<PathBuf>,
}

impl Args {
    /// Checks cross-field requirements and makes paths absolute.
    pub fn resolve(self) -> Result<RunConfig, ArgsError> {
        let event_id = self.event_id.filter(|id| !id.is_empty());
        if self.table_type == TableType::Race && event_id.is_none() {
            return Err(ArgsError::MissingEventId);
        }

        Ok(RunConfig {
            table_type: self.table_type,
            event_id: event_id.unwrap_or_default(),
            input: absolute(&self.input)?,
            output: absolute(&self.output)?,
            debug: self.debug,
            config: self.config,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ArgsError> {
    std::path::absolute(path).map_err(|source| ArgsError::InvalidPath {
        path: path.to_path_buf(),
        source,
    })
}
