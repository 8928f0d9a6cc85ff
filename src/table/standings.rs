//! Drivers' and constructors' standings line extraction.
//!
//! OCR keeps no column boundaries, so numeric columns are recovered by
//! position alone: a dropped or extra number shifts every column after it.
//! That is accepted; the CSV is reviewed by hand before publishing.

use anyhow::Result;
use regex::Regex;

use super::normalize::{Normalizer, match_team};
use super::parser::{Candidate, LineExtractor};
use super::{Row, STANDINGS_NUMERIC_COLUMNS, TableType};

/// Any standalone integer.
const INTEGER_PATTERN: &str = r"\b[0-9]+\b";

/// Values above this are taken as a points total.
const POINTS_THRESHOLD: u64 = 5;

/// Token taken as points when no value is large enough.
const POINTS_FALLBACK_INDEX: usize = 3;

/// Picks which integer token is the points total.
///
/// Points are the first number larger than five anywhere on the line. Early
/// in a season every value may be small, so the fourth token is taken only
/// when no token qualifies by magnitude.
pub fn points_index(tokens: &[&str]) -> Option<usize> {
    tokens
        .iter()
        .position(|token| {
            // Digit-only tokens only fail to parse on overflow, which is "large".
            token.parse::<u64>().map_or(true, |v| v > POINTS_THRESHOLD)
        })
        .or_else(|| (tokens.len() > POINTS_FALLBACK_INDEX).then_some(POINTS_FALLBACK_INDEX))
}

/// Writes every token except the points token into the numeric columns, in order.
pub fn assign_numeric_columns(row: &mut Row, tokens: &[&str], points_idx: Option<usize>) {
    let remaining = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != points_idx)
        .map(|(_, token)| *token);

    for (column, value) in STANDINGS_NUMERIC_COLUMNS.iter().zip(remaining) {
        row.set(column, value);
    }
}

pub struct StandingsExtractor<'a> {
    normalizer: &'a Normalizer,
    table_type: TableType,
    integer: Regex,
}

impl<'a> StandingsExtractor<'a> {
    pub fn new(normalizer: &'a Normalizer, table_type: TableType) -> Result<Self> {
        Ok(Self {
            normalizer,
            table_type,
            integer: Regex::new(INTEGER_PATTERN)?,
        })
    }

    /// Standalone integers in the region, left to right.
    pub fn integer_tokens<'r>(&self, region: &'r str) -> Vec<&'r str> {
        self.integer.find_iter(region).map(|m| m.as_str()).collect()
    }

    fn includes_driver(&self) -> bool {
        self.table_type == TableType::DriversStandings
    }
}

impl LineExtractor for StandingsExtractor<'_> {
    fn extract(&self, candidate: &Candidate<'_>) -> Result<Row> {
        let region = candidate.region;

        let tokens = self.integer_tokens(region);
        let points_idx = points_index(&tokens);
        let team = match_team(region);

        let mut row = Row::new(self.table_type);
        row.set("position", candidate.position.as_str());

        if self.includes_driver() {
            let without_numbers = self.integer.replace_all(region, " ");
            let name = self.normalizer.remove_team(&without_numbers, &team)?;
            row.set("driver_name", self.normalizer.clean_driver_name(&name));
        }

        row.set("team", team.as_str());
        row.set("points", points_idx.map(|i| tokens[i]).unwrap_or_default());
        assign_numeric_columns(&mut row, &tokens, points_idx);

        Ok(row)
    }
}
