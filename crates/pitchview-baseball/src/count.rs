// Ball-strike count filter.

use std::fmt;

use crate::record::PitchRecord;

pub const MAX_BALLS: u8 = 3;
pub const MAX_STRIKES: u8 = 2;

/// Restricts pitch sets to a ball and/or strike count. `None` means "All".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountFilter {
    pub balls: Option<u8>,
    pub strikes: Option<u8>,
}

impl CountFilter {
    pub fn is_all(&self) -> bool {
        self.balls.is_none() && self.strikes.is_none()
    }

    pub fn matches(&self, record: &PitchRecord) -> bool {
        self.balls.map_or(true, |b| record.balls == b)
            && self.strikes.map_or(true, |s| record.strikes == s)
    }

    pub fn apply(&self, records: &[PitchRecord]) -> Vec<PitchRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// All -> 0 -> 1 -> 2 -> 3 -> All
    pub fn cycle_balls(&mut self) {
        self.balls = next_value(self.balls, MAX_BALLS);
    }

    /// All -> 0 -> 1 -> 2 -> All
    pub fn cycle_strikes(&mut self) {
        self.strikes = next_value(self.strikes, MAX_STRIKES);
    }
}

fn next_value(current: Option<u8>, max: u8) -> Option<u8> {
    match current {
        None => Some(0),
        Some(v) if v < max => Some(v + 1),
        Some(_) => None,
    }
}

/// Label for one side of the filter: `"All"` or the number.
pub fn option_label(value: Option<u8>) -> String {
    value.map_or_else(|| "All".to_string(), |v| v.to_string())
}

impl fmt::Display for CountFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Balls: {}  Strikes: {}",
            option_label(self.balls),
            option_label(self.strikes)
        )
    }
}
