use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::{ParseError, ParseResult};

/// In-game date at half-year resolution: `2200.0` for January-June,
/// `2200.5` for July-December.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct GameYear(pub f64);

impl GameYear {
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year() as f64;
        if date.month() < 7 {
            GameYear(year)
        } else {
            GameYear(year + 0.5)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for GameYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Find the date line in the metadata section. The last matching line wins.
/// Only four-digit years are expected.
pub fn extract_game_year(metadata: &str, key: &str) -> ParseResult<GameYear> {
    let mut year = None;
    for line in metadata.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix(key) {
            let date = NaiveDate::parse_from_str(value.trim(), "%Y.%m.%d").map_err(|source| {
                ParseError::InvalidDate {
                    value: value.to_string(),
                    source,
                }
            })?;
            year = Some(GameYear::from_date(date));
        }
    }
    year.ok_or_else(|| ParseError::MissingDate {
        key: key.trim_end_matches('=').to_string(),
    })
}
