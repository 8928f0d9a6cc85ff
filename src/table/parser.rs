//! Line discovery shared by every table type.
//!
//! OCR text is walked line by line. Re-captured column headers and lines
//! without a leading position are noise and are dropped without error; the
//! rest of each surviving line is handed to the extractor for the table type.

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use super::normalize::{Normalizer, normalize_position};
use super::race::RaceExtractor;
use super::standings::StandingsExtractor;
use super::{Row, TableType};

/// Header words that start a re-captured column header line.
const HEADER_LINE_PATTERN: &str = r"(?i)^(pos|position|#|driver|team|constructor|name|result)";

/// One or two leading digits followed by an ASCII word boundary, so `1º` still counts.
const LEADING_POSITION_PATTERN: &str = r"^([0-9]{1,2})(?-u:\b)";

/// A line that carries a valid position, split into position and field region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub position: String,
    pub line: &'a str,
    /// Text after the position prefix, trimmed.
    pub region: &'a str,
}

/// Turns the field region of a candidate line into a row.
pub trait LineExtractor {
    fn extract(&self, candidate: &Candidate<'_>) -> Result<Row>;
}

pub struct LineParser {
    header_line: Regex,
    leading_position: Regex,
}

impl LineParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            header_line: Regex::new(HEADER_LINE_PATTERN)?,
            leading_position: Regex::new(LEADING_POSITION_PATTERN)?,
        })
    }

    pub fn is_header_line(&self, line: &str) -> bool {
        self.header_line.is_match(line)
    }

    /// Returns the candidate for a trimmed line, or `None` if the line is noise.
    pub fn candidate<'a>(&self, line: &'a str) -> Option<Candidate<'a>> {
        if self.is_header_line(line) {
            return None;
        }

        let captures = self.leading_position.captures(line)?;
        let prefix = captures.get(0)?;
        let position = normalize_position(captures.get(1)?.as_str());
        if position.is_empty() {
            return None;
        }

        Some(Candidate {
            position,
            line,
            region: line[prefix.end()..].trim(),
        })
    }

    /// Runs `extractor` over every candidate line of `text`, in order.
    pub fn parse_lines<E: LineExtractor>(&self, text: &str, extractor: &E) -> Result<Vec<Row>> {
        let mut rows = Vec::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match self.candidate(line) {
                Some(candidate) => rows.push(extractor.extract(&candidate)?),
                None => debug!("Skipping non-row line: {:?}", line),
            }
        }

        Ok(rows)
    }
}

/// Parses raw OCR text into rows for the given table type.
///
/// `event_id` is only written into race rows.
pub fn parse_table(text: &str, table_type: TableType, event_id: &str) -> Result<Vec<Row>> {
    let parser = LineParser::new()?;
    let normalizer = Normalizer::new()?;

    match table_type {
        TableType::Race => {
            let extractor = RaceExtractor::new(&normalizer, event_id)?;
            parser.parse_lines(text, &extractor)
        }
        TableType::DriversStandings | TableType::ConstructorsStandings => {
            let extractor = StandingsExtractor::new(&normalizer, table_type)?;
            parser.parse_lines(text, &extractor)
        }
    }
}
