// Strike zone geometry, in feet from the catcher's view.

use crate::record::PitchRecord;

/// Half the width of home plate (17 inches) in feet.
pub const PLATE_HALF_WIDTH: f64 = 8.5 / 12.0;

pub const DEFAULT_ZONE_TOP: f64 = 3.0;
pub const DEFAULT_ZONE_BOTTOM: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeZone {
    pub top: f64,
    pub bottom: f64,
}

impl Default for StrikeZone {
    fn default() -> Self {
        StrikeZone {
            top: DEFAULT_ZONE_TOP,
            bottom: DEFAULT_ZONE_BOTTOM,
        }
    }
}

impl StrikeZone {
    /// Average the per-pitch zone bounds. Pitches missing a bound are left out
    /// of that bound's mean; `None` when no pitch carries either bound.
    pub fn average(records: &[PitchRecord]) -> Option<StrikeZone> {
        let top = mean(records.iter().filter_map(|r| r.sz_top));
        let bottom = mean(records.iter().filter_map(|r| r.sz_bot));
        match (top, bottom) {
            (None, None) => None,
            (top, bottom) => Some(StrikeZone {
                top: top.unwrap_or(DEFAULT_ZONE_TOP),
                bottom: bottom.unwrap_or(DEFAULT_ZONE_BOTTOM),
            }),
        }
    }

    /// Closed outline of the zone: four corners with the first repeated.
    pub fn outline(&self) -> [(f64, f64); 5] {
        let (l, r) = (-PLATE_HALF_WIDTH, PLATE_HALF_WIDTH);
        [
            (l, self.bottom),
            (r, self.bottom),
            (r, self.top),
            (l, self.top),
            (l, self.bottom),
        ]
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}
