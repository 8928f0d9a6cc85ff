//! Field normalizers shared by the race and standings extractors.
//!
//! OCR on table screenshots misreads digits as look-alike glyphs, drops
//! spaces between words, and picks up flag emoji next to driver names.
//! These helpers undo the common cases.

use anyhow::Result;
use regex::Regex;

/// Lowest valid finishing/standings position.
pub const MIN_POSITION: u32 = 1;
/// Highest valid finishing/standings position.
pub const MAX_POSITION: u32 = 30;

/// Canonical team names as they appear in league tables.
pub const KNOWN_TEAMS: &[&str] = &[
    "ALPINE",
    "ASTON MARTIN",
    "FERRARI",
    "HAAS FERRARI",
    "KICK SAUBER",
    "MCLAREN",
    "MERCEDES",
    "RACING BULLS",
    "RED BULL",
    "WILLIAMS",
];

/// Maps a glyph OCR commonly returns in place of a digit.
fn confusable_digit(c: char) -> char {
    match c {
        'o' | 'O' | '@' => '0',
        'l' | 'I' | '|' => '1',
        'é' => '6',
        '®' => '9',
        other => other,
    }
}

/// Normalizes a captured position string.
///
/// Look-alike glyphs are mapped to digits and everything else is dropped.
/// Returns the position as a plain integer string, or an empty string when
/// the result is not a position in `MIN_POSITION..=MAX_POSITION`.
pub fn normalize_position(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .map(confusable_digit)
        .filter(char::is_ascii_digit)
        .collect();

    match digits.parse::<u32>() {
        Ok(n) if (MIN_POSITION..=MAX_POSITION).contains(&n) => n.to_string(),
        _ => String::new(),
    }
}

/// Result of matching OCR text against [`KNOWN_TEAMS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamMatch {
    /// A roster team was found in the text.
    Known(&'static str),
    /// No roster team matched; holds the trimmed input text.
    Unknown(String),
}

impl TeamMatch {
    pub fn as_str(&self) -> &str {
        match self {
            TeamMatch::Known(name) => name,
            TeamMatch::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, TeamMatch::Known(_))
    }
}

/// Roster sorted longest name first, so "HAAS FERRARI" wins over "FERRARI".
fn teams_by_length() -> Vec<&'static str> {
    let mut teams = KNOWN_TEAMS.to_vec();
    teams.sort_by(|a, b| b.len().cmp(&a.len()));
    teams
}

/// Fuzzy-matches raw text against the known team roster.
///
/// The text is upper-cased and reduced to letters and single spaces. Each
/// roster name is first looked for with all spaces removed from both sides
/// (OCR often drops or inserts spaces), then as a plain substring.
pub fn match_team(raw: &str) -> TeamMatch {
    let letters: String = raw
        .to_uppercase()
        .chars()
        .map(|c| if c.is_ascii_uppercase() { c } else { ' ' })
        .collect();
    let upper = letters.split_whitespace().collect::<Vec<_>>().join(" ");
    let compressed = upper.replace(' ', "");

    let teams = teams_by_length();

    if let Some(team) = teams
        .iter()
        .find(|team| compressed.contains(&team.replace(' ', "")))
    {
        return TeamMatch::Known(*team);
    }

    if let Some(team) = teams.iter().find(|team| upper.contains(**team)) {
        return TeamMatch::Known(*team);
    }

    TeamMatch::Unknown(raw.trim().to_string())
}

/// Compiled patterns for cleaning driver names and cutting team names out of text.
pub struct Normalizer {
    flag_glyphs: Regex,
    pictographs: Regex,
    trade_marks: Regex,
    trailing_digits: Regex,
    disallowed: Regex,
    whitespace: Regex,
    camel_case: Regex,
}

impl Normalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            flag_glyphs: Regex::new(r"[\x{1F1E6}-\x{1F1FF}]")?,
            pictographs: Regex::new(r"[\x{1F300}-\x{1FAFF}]")?,
            trade_marks: Regex::new(r"[™©®]")?,
            trailing_digits: Regex::new(r"[0-9]+$")?,
            disallowed: Regex::new(r"[^a-zA-Z\x{C0}-\x{FF}\s'.,-]")?,
            whitespace: Regex::new(r"\s+")?,
            camel_case: Regex::new(r"([a-z])([A-Z])")?,
        })
    }

    /// Cleans a raw driver-name fragment.
    ///
    /// Strips flag and pictograph emoji, trade marks, trailing digits and
    /// anything that is not a letter or `' . , -`, then splits words OCR
    /// glued together ("JohnDoe" -> "John Doe"). May return an empty string.
    pub fn clean_driver_name(&self, raw: &str) -> String {
        let name = self.flag_glyphs.replace_all(raw, "");
        let name = self.pictographs.replace_all(&name, "");
        let name = self.trade_marks.replace_all(&name, "");
        let name = self.trailing_digits.replace_all(&name, "");
        let name = self.disallowed.replace_all(&name, " ");
        let name = self.whitespace.replace_all(&name, " ");
        let name = name.trim();

        self.camel_case.replace_all(name, "$1 $2").into_owned()
    }

    /// Removes every occurrence of a matched team from `text`, case-insensitively.
    ///
    /// Known roster names also match with the spaces between their words
    /// missing or doubled, mirroring [`match_team`].
    pub fn remove_team(&self, text: &str, team: &TeamMatch) -> Result<String> {
        let pattern = match team {
            TeamMatch::Known(name) => name
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s*"),
            TeamMatch::Unknown(raw) => {
                if raw.trim().is_empty() {
                    return Ok(text.to_string());
                }
                regex::escape(raw.trim())
            }
        };

        let team_regex = Regex::new(&format!("(?i){pattern}"))?;
        Ok(team_regex.replace_all(text, " ").into_owned())
    }
}
