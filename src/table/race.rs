//! Race-result line extraction.
//!
//! Only the fields that can be recovered from a single OCR line are filled:
//! driver, team, time/gap, best lap, points and status. Grid, laps, stops and
//! the other columns are left empty for manual correction.

use anyhow::Result;
use regex::Regex;
use std::ops::Range;

use super::normalize::{Normalizer, match_team};
use super::parser::{Candidate, LineExtractor};
use super::{Row, TableType};

/// Gap to the leader: `+0.000`, `+12.345`, `+1:02.3`.
const GAP_PATTERN: &str = r"\+[0-9]+[.:,][0-9]+";
/// Retirement markers, case-insensitive.
const STATUS_PATTERN: &str = r"(?i)DNF|DSQ|DNS";
/// Race or lap time: `1:32.456`, `25:01:23`.
const LAP_TIME_PATTERN: &str = r"[0-9]{1,2}:[0-9]{2}[.:,][0-9]{2,3}";
/// A single lap: exactly one digit before the colon and a decimal point.
const BEST_LAP_PATTERN: &str = r"\b([0-9]:[0-9]{2}\.[0-9]{2,3})\b";
/// Standalone 1-3 digit number.
const POINTS_PATTERN: &str = r"\b[0-9]{1,3}\b";

/// A time-like token and where it sits in the field region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingMatch {
    pub text: String,
    pub span: Range<usize>,
}

pub struct RaceExtractor<'a> {
    normalizer: &'a Normalizer,
    event_id: String,
    gap: Regex,
    status: Regex,
    lap_time: Regex,
    timing_token: Regex,
    best_lap: Regex,
    points: Regex,
}

impl<'a> RaceExtractor<'a> {
    pub fn new(normalizer: &'a Normalizer, event_id: &str) -> Result<Self> {
        Ok(Self {
            normalizer,
            event_id: event_id.to_string(),
            gap: Regex::new(GAP_PATTERN)?,
            status: Regex::new(STATUS_PATTERN)?,
            lap_time: Regex::new(LAP_TIME_PATTERN)?,
            timing_token: Regex::new(&format!(
                "(?i){GAP_PATTERN}|{LAP_TIME_PATTERN}|DNF|DSQ|DNS"
            ))?,
            best_lap: Regex::new(BEST_LAP_PATTERN)?,
            points: Regex::new(POINTS_PATTERN)?,
        })
    }

    /// Finds the time/gap column.
    ///
    /// A gap wins over a retirement marker, which wins over a plain time, so a
    /// leader's best lap printed before the gap is not taken as the gap.
    /// Decimal commas are rewritten as periods.
    pub fn time_or_gap(&self, region: &str) -> Option<TimingMatch> {
        if let Some(m) = self.gap.find(region) {
            return Some(TimingMatch {
                text: m.as_str().replace(',', "."),
                span: m.range(),
            });
        }
        if let Some(m) = self.status.find(region) {
            return Some(TimingMatch {
                text: m.as_str().to_ascii_uppercase(),
                span: m.range(),
            });
        }
        self.lap_time.find(region).map(|m| TimingMatch {
            text: m.as_str().replace(',', "."),
            span: m.range(),
        })
    }

    /// First single-lap time that does not overlap the time/gap token.
    pub fn best_lap(&self, region: &str, time_or_gap: Option<&TimingMatch>) -> Option<String> {
        self.best_lap
            .captures_iter(region)
            .filter_map(|c| c.get(1))
            .find(|m| {
                time_or_gap.is_none_or(|t| m.end() <= t.span.start || m.start() >= t.span.end)
            })
            .map(|m| m.as_str().to_string())
    }

    /// Blanks out every gap, time and retirement marker.
    pub fn strip_timing(&self, region: &str) -> String {
        self.timing_token.replace_all(region, " ").into_owned()
    }

    /// Points are the last standalone number once timing tokens are gone.
    pub fn points(&self, stripped: &str) -> Option<String> {
        self.points
            .find_iter(stripped)
            .last()
            .map(|m| m.as_str().to_string())
    }

    /// Blanks out every standalone 1-3 digit number.
    pub fn strip_numbers(&self, text: &str) -> String {
        self.points.replace_all(text, " ").into_owned()
    }

    /// `DNF`, `DSQ` or `DNS` if the marker appears anywhere on the line.
    pub fn status(line: &str) -> &'static str {
        let upper = line.to_ascii_uppercase();
        if upper.contains("DNF") {
            "DNF"
        } else if upper.contains("DSQ") {
            "DSQ"
        } else if upper.contains("DNS") {
            "DNS"
        } else {
            "Finished"
        }
    }
}

impl LineExtractor for RaceExtractor<'_> {
    fn extract(&self, candidate: &Candidate<'_>) -> Result<Row> {
        let region = candidate.region;

        let timing = self.time_or_gap(region);
        let best_lap = self.best_lap(region, timing.as_ref());
        let stripped = self.strip_timing(region);
        let points = self.points(&stripped);

        let residue = self.strip_numbers(&stripped);
        let team = match_team(&residue);
        let driver_raw = self.normalizer.remove_team(&residue, &team)?;

        let mut row = Row::new(TableType::Race);
        row.set("event_id", self.event_id.as_str());
        row.set("position", candidate.position.as_str());
        row.set("driver_name", self.normalizer.clean_driver_name(&driver_raw));
        row.set("team", team.as_str());
        row.set("time_or_gap", timing.map(|t| t.text).unwrap_or_default());
        row.set("best_lap", best_lap.unwrap_or_default());
        row.set("points", points.unwrap_or_default());
        row.set("status", Self::status(candidate.line));

        Ok(row)
    }
}
