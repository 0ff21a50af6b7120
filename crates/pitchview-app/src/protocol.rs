// Message types exchanged between the TUI and the application loop.

use chrono::NaiveDate;

use pitchview_baseball::count::CountFilter;
use pitchview_baseball::frequency::FrequencyTable;
use pitchview_baseball::pitch::PitchColor;
use pitchview_baseball::register::PlayerIdentity;
use pitchview_baseball::zone::StrikeZone;

// ---------------------------------------------------------------------------
// Shared enums
// ---------------------------------------------------------------------------

/// Which side of the matchup a search or selection applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Pitcher,
    Batter,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Pitcher => "Pitcher",
            Role::Batter => "Batter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A one-line message for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TUI -> app
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Look up players by name. An empty first name matches any first name.
    Search {
        role: Role,
        first: String,
        last: String,
    },
    /// Pick one of the most recent search results for `role`.
    SelectPlayer { role: Role, index: usize },
    /// Fetch and derive the matchup for the selected players (inclusive).
    RunQuery { start: NaiveDate, end: NaiveDate },
    /// Re-derive the current matchup under a new count filter.
    SetCountFilter(CountFilter),
    Quit,
}

// ---------------------------------------------------------------------------
// app -> TUI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    SearchStarted(Role),
    /// A non-empty search result list; the first entry is selected.
    SearchResults {
        role: Role,
        players: Vec<PlayerIdentity>,
    },
    /// A search for `role` finished without new results (none found or
    /// failed); the previous results stay.
    SearchEnded(Role),
    /// The selected search result for `role` changed.
    Selection { role: Role, index: usize },
    QueryRunning(bool),
    MatchupReady(Box<MatchupView>),
    Notice(Notice),
}

// ---------------------------------------------------------------------------
// Derived matchup payload
// ---------------------------------------------------------------------------

/// One matchup pitch, decorated for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PlottedPitch {
    pub pitch_name: &'static str,
    pub color: PitchColor,
    pub speed: Option<f64>,
    pub result: String,
    pub count: String,
    pub plate_x: Option<f64>,
    pub plate_z: Option<f64>,
    pub game_date: Option<NaiveDate>,
}

/// Pitch totals behind the two frequency tables, after count filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchupTotals {
    pub matchup: usize,
    pub pitcher: usize,
    pub batter: usize,
    pub batter_matchup: usize,
}

/// Everything the TUI renders for one query under one count filter.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupView {
    pub title: String,
    pub pitches: Vec<PlottedPitch>,
    pub zone: StrikeZone,
    pub pitcher_frequency: FrequencyTable,
    pub batter_frequency: FrequencyTable,
    /// Set when the query found no pitches between the two players.
    pub warning: Option<String>,
    pub filter: CountFilter,
    pub totals: MatchupTotals,
}

impl MatchupView {
    /// The view shown before any query has run.
    pub fn empty() -> Self {
        MatchupView {
            title: String::new(),
            pitches: Vec::new(),
            zone: StrikeZone::default(),
            pitcher_frequency: FrequencyTable::default(),
            batter_frequency: FrequencyTable::default(),
            warning: None,
            filter: CountFilter::default(),
            totals: MatchupTotals::default(),
        }
    }
}
