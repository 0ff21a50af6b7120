// Statcast pitch records and CSV parsing.
//
// Baseball Savant's `statcast_search/csv` endpoint returns one row per pitch
// with ~90 columns. Only the columns the dashboard uses are deserialized;
// the rest are ignored. Numeric cells are frequently empty (or `null`) for
// pitches the tracking system missed, so those fields are optional.

use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::events::format_result;
use crate::pitch::{pitch_color, pitch_name, PitchColor};

/// Columns without which a Statcast response is unusable.
pub const REQUIRED_COLUMNS: &[&str] = &["pitch_type", "balls", "strikes", "batter", "pitcher"];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One pitched ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchRecord {
    pub pitch_type: String,
    pub game_date: Option<NaiveDate>,
    pub game_pk: Option<u64>,
    pub at_bat_number: Option<u32>,
    pub pitch_number: Option<u32>,
    pub release_speed: Option<f64>,
    pub plate_x: Option<f64>,
    pub plate_z: Option<f64>,
    pub balls: u8,
    pub strikes: u8,
    pub batter: u64,
    pub pitcher: u64,
    pub events: String,
    pub description: String,
    pub sz_top: Option<f64>,
    pub sz_bot: Option<f64>,
}

impl PitchRecord {
    pub fn pitch_name(&self) -> &'static str {
        pitch_name(&self.pitch_type)
    }

    pub fn color(&self) -> PitchColor {
        pitch_color(&self.pitch_type)
    }

    pub fn result_label(&self) -> String {
        format_result(&self.events, &self.description)
    }

    /// Ball-strike count as shown in the pitch list, e.g. `"1, 2"`.
    pub fn count_label(&self) -> String {
        format!("{}, {}", self.balls, self.strikes)
    }

    /// Sort key placing pitches in the order they were thrown.
    fn chronological_key(&self) -> (Option<NaiveDate>, Option<u64>, Option<u32>, Option<u32>) {
        (self.game_date, self.game_pk, self.at_bat_number, self.pitch_number)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("response is missing required column `{0}`")]
    MissingColumn(String),
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPitchRow {
    #[serde(default)]
    pitch_type: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    game_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    game_pk: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    at_bat_number: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pitch_number: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    release_speed: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    plate_x: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    plate_z: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    balls: Option<u8>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    strikes: Option<u8>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    batter: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pitcher: Option<u64>,
    #[serde(default)]
    events: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    sz_top: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    sz_bot: Option<f64>,
}

/// Savant writes missing strings as `null` in some exports.
fn clean_text(s: String) -> String {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("null") {
        String::new()
    } else if trimmed.len() == s.len() {
        s
    } else {
        trimmed.to_string()
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

impl RawPitchRow {
    fn into_record(self) -> Option<PitchRecord> {
        let (Some(balls), Some(strikes), Some(batter), Some(pitcher)) =
            (self.balls, self.strikes, self.batter, self.pitcher)
        else {
            return None;
        };
        Some(PitchRecord {
            pitch_type: clean_text(self.pitch_type),
            game_date: self.game_date,
            game_pk: self.game_pk,
            at_bat_number: self.at_bat_number,
            pitch_number: self.pitch_number,
            release_speed: finite(self.release_speed),
            plate_x: finite(self.plate_x),
            plate_z: finite(self.plate_z),
            balls,
            strikes,
            batter,
            pitcher,
            events: clean_text(self.events),
            description: clean_text(self.description),
            sz_top: finite(self.sz_top),
            sz_bot: finite(self.sz_bot),
        })
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Read pitch records from a Statcast CSV stream.
///
/// Rows lacking a count or player ids are skipped with a warning. The result
/// is ordered chronologically (date, game, at-bat, pitch); Savant returns
/// newest first.
pub fn read_pitches<R: Read>(rdr: R) -> Result<Vec<PitchRecord>, RecordError> {
    let mut reader = csv::Reader::from_reader(rdr);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || (headers.len() == 1 && headers[0].trim().is_empty()) {
        return Ok(Vec::new());
    }
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim_start_matches('\u{feff}') == *column) {
            return Err(RecordError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<RawPitchRow>().enumerate() {
        match result {
            Ok(raw) => match raw.into_record() {
                Some(record) => records.push(record),
                None => warn!("skipping pitch row {}: missing count or player id", idx + 1),
            },
            Err(e) => {
                warn!("skipping malformed pitch row {}: {}", idx + 1, e);
            }
        }
    }

    records.sort_by_key(PitchRecord::chronological_key);
    Ok(records)
}

/// Parse a Statcast CSV response body. A leading UTF-8 byte-order mark and an
/// empty body are both accepted.
pub fn parse_pitches(body: &str) -> Result<Vec<PitchRecord>, RecordError> {
    let body = body.strip_prefix('\u{feff}').unwrap_or(body);
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    read_pitches(body.as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
