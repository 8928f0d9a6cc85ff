//! Table shapes and the rows parsed out of them.
//!
//! Each [`TableType`] owns a fixed header schema. A [`Row`] always carries
//! exactly those headers, in order; fields the parser could not recover stay
//! as empty strings.

pub mod normalize;
pub mod parser;
pub mod race;
pub mod standings;

pub use parser::parse_table;

use clap::ValueEnum;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

pub const RACE_HEADERS: &[&str] = &[
    "event_id",
    "position",
    "position_change",
    "driver_name",
    "team",
    "time_or_gap",
    "best_lap",
    "laps",
    "grid",
    "stops",
    "kph",
    "overtakes",
    "laps_led",
    "distance_led",
    "steward_penalty",
    "game_penalty",
    "points",
    "status",
    "fastest_lap",
    "dotd",
];

pub const DRIVERS_STANDINGS_HEADERS: &[&str] = &[
    "position",
    "position_change",
    "driver_name",
    "team",
    "points",
    "gain",
    "interval",
    "gap",
    "p1",
    "p2",
    "p3",
    "top5",
    "top10",
    "best_finish",
    "best_quali",
    "fastest_laps",
    "poles",
    "dotd",
    "penalty_points",
    "dnfs",
    "races",
];

pub const CONSTRUCTORS_STANDINGS_HEADERS: &[&str] = &[
    "position",
    "position_change",
    "team",
    "points",
    "gain",
    "interval",
    "gap",
    "p1",
    "p2",
    "p3",
    "top5",
    "top10",
    "best_finish",
    "best_quali",
    "fastest_laps",
    "poles",
    "dotd",
    "penalty_points",
    "dnfs",
    "races",
];

/// Standings columns filled left-to-right from the numbers left over after points.
pub const STANDINGS_NUMERIC_COLUMNS: &[&str] = &[
    "gain",
    "interval",
    "gap",
    "p1",
    "p2",
    "p3",
    "top5",
    "top10",
    "best_finish",
    "best_quali",
    "fastest_laps",
    "poles",
    "dotd",
    "penalty_points",
    "dnfs",
    "races",
];

/// The kind of table shown in the source screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableType {
    Race,
    DriversStandings,
    ConstructorsStandings,
}

impl TableType {
    /// Output columns for this table, in CSV order.
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            TableType::Race => RACE_HEADERS,
            TableType::DriversStandings => DRIVERS_STANDINGS_HEADERS,
            TableType::ConstructorsStandings => CONSTRUCTORS_STANDINGS_HEADERS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TableType::Race => "race",
            TableType::DriversStandings => "drivers-standings",
            TableType::ConstructorsStandings => "constructors-standings",
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed table line, keyed by the header schema of its table type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    headers: &'static [&'static str],
    values: Vec<String>,
}

impl Row {
    /// Creates a row with every field empty.
    pub fn new(table_type: TableType) -> Self {
        let headers = table_type.headers();
        Self {
            headers,
            values: vec![String::new(); headers.len()],
        }
    }

    /// Sets a field. Names outside the schema are ignored.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        if let Some(idx) = self.headers.iter().position(|h| *h == field) {
            self.values[idx] = value.into();
        }
    }

    /// Returns a field value, or "" for unset and unknown fields.
    pub fn get(&self, field: &str) -> &str {
        self.headers
            .iter()
            .position(|h| *h == field)
            .map(|idx| self.values[idx].as_str())
            .unwrap_or("")
    }

    pub fn headers(&self) -> &'static [&'static str] {
        self.headers
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, value) in self.headers.iter().zip(&self.values) {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}
