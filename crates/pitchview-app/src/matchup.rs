// Matchup derivation: narrows both players' pitch sets to the pitches they
// exchanged and turns them into the view the TUI renders.

use pitchview_baseball::count::CountFilter;
use pitchview_baseball::frequency::pitch_frequency;
use pitchview_baseball::record::PitchRecord;
use pitchview_baseball::register::PlayerIdentity;
use pitchview_baseball::zone::StrikeZone;

use crate::protocol::{MatchupTotals, MatchupView, PlottedPitch};
use crate::provider::DateRange;

pub const NO_MATCHUPS: &str = "No matchups in specified time frame";

/// Everything fetched for one query. Count filtering is applied on demand by
/// `view`, so the filter can change without refetching.
#[derive(Debug, Clone)]
pub struct MatchupData {
    pub pitcher: PlayerIdentity,
    pub batter: PlayerIdentity,
    pub range: DateRange,
    /// All pitches thrown by the pitcher in range.
    pitcher_pitches: Vec<PitchRecord>,
    /// All pitches seen by the batter in range.
    batter_pitches: Vec<PitchRecord>,
    /// Pitcher records whose batter is the selected batter.
    matchup: Vec<PitchRecord>,
    /// Batter records whose pitcher is the selected pitcher.
    batter_matchup: Vec<PitchRecord>,
    zone: StrikeZone,
}

impl MatchupData {
    pub fn new(
        pitcher: PlayerIdentity,
        batter: PlayerIdentity,
        range: DateRange,
        pitcher_pitches: Vec<PitchRecord>,
        batter_pitches: Vec<PitchRecord>,
    ) -> Self {
        let matchup: Vec<PitchRecord> = pitcher_pitches
            .iter()
            .filter(|r| r.batter == batter.id)
            .cloned()
            .collect();
        let batter_matchup: Vec<PitchRecord> = batter_pitches
            .iter()
            .filter(|r| r.pitcher == pitcher.id)
            .cloned()
            .collect();
        let zone = StrikeZone::average(&matchup).unwrap_or_default();

        MatchupData {
            pitcher,
            batter,
            range,
            pitcher_pitches,
            batter_pitches,
            matchup,
            batter_matchup,
            zone,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matchup.is_empty()
    }

    pub fn matchup_len(&self) -> usize {
        self.matchup.len()
    }

    pub fn zone(&self) -> StrikeZone {
        self.zone
    }

    pub fn title(&self) -> String {
        plot_title(&self.pitcher, &self.batter)
    }

    /// Derive the rendered view under `filter`.
    ///
    /// An empty matchup yields no pitches, empty frequency tables, the
    /// default zone and the `NO_MATCHUPS` warning. The zone always reflects
    /// the unfiltered matchup.
    pub fn view(&self, filter: CountFilter) -> MatchupView {
        if self.is_empty() {
            return MatchupView {
                title: self.title(),
                warning: Some(NO_MATCHUPS.to_string()),
                filter,
                totals: MatchupTotals {
                    pitcher: self.pitcher_pitches.len(),
                    batter: self.batter_pitches.len(),
                    ..MatchupTotals::default()
                },
                ..MatchupView::empty()
            };
        }

        let matchup = filter.apply(&self.matchup);
        let pitcher_reference = filter.apply(&self.pitcher_pitches);
        let batter_reference = filter.apply(&self.batter_pitches);
        let batter_matchup = filter.apply(&self.batter_matchup);

        MatchupView {
            title: self.title(),
            pitches: matchup.iter().map(decorate).collect(),
            zone: self.zone,
            pitcher_frequency: pitch_frequency(&pitcher_reference, &matchup),
            batter_frequency: pitch_frequency(&batter_reference, &batter_matchup),
            warning: None,
            filter,
            totals: MatchupTotals {
                matchup: matchup.len(),
                pitcher: pitcher_reference.len(),
                batter: batter_reference.len(),
                batter_matchup: batter_matchup.len(),
            },
        }
    }
}

/// `"{pitcher} vs. {batter}"` using the names without their id suffix.
pub fn plot_title(pitcher: &PlayerIdentity, batter: &PlayerIdentity) -> String {
    format!("{} vs. {}", pitcher.name(), batter.name())
}

pub fn decorate(record: &PitchRecord) -> PlottedPitch {
    PlottedPitch {
        pitch_name: record.pitch_name(),
        color: record.color(),
        speed: record.release_speed,
        result: record.result_label(),
        count: record.count_label(),
        plate_x: record.plate_x,
        plate_z: record.plate_z,
        game_date: record.game_date,
    }
}
