// Integration tests for the matchup dashboard's application layer.
//
// These drive the public event loop (`app::run`) end-to-end with a fixture
// statistics provider backed by CSV files in the same formats the live
// services return: Statcast pitch exports and a Chadwick register shard.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{mpsc, Semaphore};

use pitchview_app::app::{self, Session, QUERY_ALREADY_RUNNING, SELECT_BOTH_PLAYERS};
use pitchview_app::config::*;
use pitchview_app::matchup::NO_MATCHUPS;
use pitchview_app::protocol::*;
use pitchview_app::provider::{DateRange, FetchError, StatsProvider};
use pitchview_baseball::count::CountFilter;
use pitchview_baseball::record::{read_pitches, PitchRecord, RecordError};
use pitchview_baseball::register::{read_chadwick_shard, PlayerIdentity, PlayerRegister};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the crate root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures";

const KERSHAW: u64 = 477132;
const TROUT: u64 = 545361;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn load_pitches(file: &str) -> Vec<PitchRecord> {
    let f = std::fs::File::open(format!("{FIXTURES}/{file}")).unwrap();
    read_pitches(f).unwrap()
}

fn load_register() -> PlayerRegister {
    let f = std::fs::File::open(format!("{FIXTURES}/people.csv")).unwrap();
    PlayerRegister::new(read_chadwick_shard(f).unwrap())
}

fn inline_config() -> Config {
    Config {
        savant: SavantConfig {
            base_url: "http://localhost/statcast_search/csv".into(),
            timeout_secs: 5,
        },
        register: RegisterConfig {
            base_url: "http://localhost/register".into(),
            shards: "0123456789abcdef".into(),
            cache_file: "player-register.csv".into(),
        },
        dates: DatesConfig {
            earliest: date(2017, 4, 1),
        },
    }
}

/// Serves players from the register fixture and pitches from the Statcast
/// fixtures, restricted to the requested date range.
struct FixtureProvider {
    register: PlayerRegister,
    by_pitcher: HashMap<u64, Vec<PitchRecord>>,
    by_batter: HashMap<u64, Vec<PitchRecord>>,
    /// When set, each pitch request waits for a permit.
    gate: Option<Arc<Semaphore>>,
    /// When set, each player search waits for a permit.
    search_gate: Option<Arc<Semaphore>>,
    fail_pitches: bool,
    pitch_requests: AtomicUsize,
}

impl FixtureProvider {
    fn new() -> Self {
        let mut by_pitcher = HashMap::new();
        by_pitcher.insert(KERSHAW, load_pitches("kershaw_pitches.csv"));
        let mut by_batter = HashMap::new();
        by_batter.insert(TROUT, load_pitches("trout_pitches.csv"));
        FixtureProvider {
            register: load_register(),
            by_pitcher,
            by_batter,
            gate: None,
            search_gate: None,
            fail_pitches: false,
            pitch_requests: AtomicUsize::new(0),
        }
    }

    async fn serve(
        &self,
        source: &HashMap<u64, Vec<PitchRecord>>,
        id: u64,
        range: DateRange,
    ) -> Result<Vec<PitchRecord>, FetchError> {
        self.pitch_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        if self.fail_pitches {
            return Err(FetchError::Parse(RecordError::MissingColumn(
                "pitch_type".into(),
            )));
        }
        Ok(source
            .get(&id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| {
                        r.game_date
                            .is_some_and(|d| d >= range.start() && d <= range.end())
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl StatsProvider for FixtureProvider {
    async fn search_players(
        &self,
        first: &str,
        last: &str,
    ) -> Result<Vec<PlayerIdentity>, FetchError> {
        if let Some(gate) = &self.search_gate {
            // Each permit admits exactly one search.
            gate.acquire().await.unwrap().forget();
        }
        Ok(self.register.search(Some(first), last))
    }

    async fn pitches_by_pitcher(
        &self,
        id: u64,
        range: DateRange,
    ) -> Result<Vec<PitchRecord>, FetchError> {
        self.serve(&self.by_pitcher, id, range).await
    }

    async fn pitches_faced_by_batter(
        &self,
        id: u64,
        range: DateRange,
    ) -> Result<Vec<PitchRecord>, FetchError> {
        self.serve(&self.by_batter, id, range).await
    }
}

struct Harness {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    fn start(provider: Arc<FixtureProvider>) -> Self {
        let (task_tx, task_rx) = mpsc::channel(16);
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, ui_rx) = mpsc::channel(64);
        let session = Session::new(inline_config(), provider, task_tx);
        let handle = tokio::spawn(app::run(task_rx, cmd_rx, ui_tx, session));
        Harness {
            cmd_tx,
            ui_rx,
            handle,
        }
    }

    async fn send(&self, cmd: UserCommand) {
        self.cmd_tx.send(cmd).await.unwrap();
    }

    async fn recv(&mut self) -> UiUpdate {
        tokio::time::timeout(Duration::from_secs(5), self.ui_rx.recv())
            .await
            .expect("timed out waiting for UI update")
            .expect("UI channel closed")
    }

    async fn search(&mut self, role: Role, first: &str, last: &str) -> Vec<PlayerIdentity> {
        self.send(UserCommand::Search {
            role,
            first: first.into(),
            last: last.into(),
        })
        .await;
        assert_eq!(self.recv().await, UiUpdate::SearchStarted(role));
        match self.recv().await {
            UiUpdate::SearchResults { role: r, players } => {
                assert_eq!(r, role);
                players
            }
            other => panic!("Expected SearchResults, got {:?}", other),
        }
    }

    /// Select Kershaw as the pitcher and Trout as the batter.
    async fn select_matchup(&mut self) {
        let pitchers = self.search(Role::Pitcher, "Clayton", "Kershaw").await;
        assert_eq!(pitchers[0].id, KERSHAW);
        let batters = self.search(Role::Batter, "", "trout").await;
        assert_eq!(batters[0].id, TROUT);
    }

    async fn run_query(&mut self, start: NaiveDate, end: NaiveDate) -> MatchupView {
        self.send(UserCommand::RunQuery { start, end }).await;
        assert_eq!(self.recv().await, UiUpdate::QueryRunning(true));
        assert_eq!(self.recv().await, UiUpdate::QueryRunning(false));
        match self.recv().await {
            UiUpdate::MatchupReady(view) => *view,
            other => panic!("Expected MatchupReady, got {:?}", other),
        }
    }

    /// Assert that no update arrives within a short window.
    async fn expect_quiet(&mut self) {
        let next = tokio::time::timeout(Duration::from_millis(200), self.ui_rx.recv()).await;
        assert!(next.is_err(), "unexpected UI update: {:?}", next);
    }

    async fn quit(self) {
        self.cmd_tx.send(UserCommand::Quit).await.unwrap();
        let result = self.handle.await.unwrap();
        assert!(result.is_ok());
    }
}

// ===========================================================================
// Fixtures
// ===========================================================================

#[test]
fn fixture_csv_files_parse() {
    let kershaw = load_pitches("kershaw_pitches.csv");
    assert_eq!(kershaw.len(), 9);
    assert!(kershaw.iter().all(|r| r.pitcher == KERSHAW));

    let trout = load_pitches("trout_pitches.csv");
    assert_eq!(trout.len(), 8);
    assert!(trout.iter().all(|r| r.batter == TROUT));

    // Chronological ordering, oldest first.
    assert_eq!(trout[0].game_date, Some(date(2019, 5, 3)));
    assert_eq!(trout[0].at_bat_number, Some(10));
    assert_eq!(trout[0].pitch_number, Some(1));

    assert_eq!(load_register().len(), 6);
}

// ===========================================================================
// Search
// ===========================================================================

#[tokio::test]
async fn search_by_last_name_lists_all_matches() {
    let mut h = Harness::start(Arc::new(FixtureProvider::new()));
    let players = h.search(Role::Pitcher, "", "SMITH").await;
    let labels: Vec<&str> = players.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["Joe Smith - 999002", "John Smith - 999001"]);

    h.send(UserCommand::SelectPlayer {
        role: Role::Pitcher,
        index: 1,
    })
    .await;
    assert_eq!(
        h.recv().await,
        UiUpdate::Selection {
            role: Role::Pitcher,
            index: 1
        }
    );
    h.quit().await;
}

#[tokio::test]
async fn unknown_player_reports_no_players_found() {
    let mut h = Harness::start(Arc::new(FixtureProvider::new()));
    h.send(UserCommand::Search {
        role: Role::Batter,
        first: "Babe".into(),
        last: "Ruth".into(),
    })
    .await;
    assert_eq!(h.recv().await, UiUpdate::SearchStarted(Role::Batter));
    assert_eq!(h.recv().await, UiUpdate::SearchEnded(Role::Batter));
    match h.recv().await {
        UiUpdate::Notice(n) => {
            assert_eq!(n.level, NoticeLevel::Warning);
            assert_eq!(n.text, "No players found");
        }
        other => panic!("Expected Notice, got {:?}", other),
    }
    h.quit().await;
}

#[tokio::test]
async fn cached_search_supersedes_search_in_flight() {
    let gate = Arc::new(Semaphore::new(1));
    let mut provider = FixtureProvider::new();
    provider.search_gate = Some(Arc::clone(&gate));
    let mut h = Harness::start(Arc::new(provider));

    // First lookup uses the only permit and fills the cache.
    let pitchers = h.search(Role::Pitcher, "Clayton", "Kershaw").await;
    assert_eq!(pitchers[0].id, KERSHAW);

    // This one blocks on the gate.
    h.send(UserCommand::Search {
        role: Role::Pitcher,
        first: String::new(),
        last: "smith".into(),
    })
    .await;
    assert_eq!(h.recv().await, UiUpdate::SearchStarted(Role::Pitcher));

    // Served from the cache while the smith search is still running.
    h.send(UserCommand::Search {
        role: Role::Pitcher,
        first: "clayton".into(),
        last: "kershaw".into(),
    })
    .await;
    match h.recv().await {
        UiUpdate::SearchResults { role, players } => {
            assert_eq!(role, Role::Pitcher);
            assert_eq!(players[0].id, KERSHAW);
        }
        other => panic!("Expected SearchResults, got {:?}", other),
    }

    // The smith search completes but must not replace the latest results.
    gate.add_permits(10);
    h.expect_quiet().await;

    let batters = h.search(Role::Batter, "", "trout").await;
    assert_eq!(batters[0].id, TROUT);
    let view = h.run_query(date(2019, 4, 1), date(2019, 9, 30)).await;
    assert_eq!(view.title, "Clayton Kershaw vs. Mike Trout");
    h.quit().await;
}

// ===========================================================================
// Matchup queries
// ===========================================================================

#[tokio::test]
async fn full_matchup_query() {
    let mut h = Harness::start(Arc::new(FixtureProvider::new()));
    h.select_matchup().await;
    let view = h.run_query(date(2019, 4, 1), date(2019, 9, 30)).await;

    assert_eq!(view.title, "Clayton Kershaw vs. Mike Trout");
    assert!(view.warning.is_none());
    assert_eq!(view.totals.matchup, 5);
    assert_eq!(view.totals.pitcher, 9);
    assert_eq!(view.totals.batter, 8);
    assert_eq!(view.totals.batter_matchup, 5);

    let results: Vec<&str> = view.pitches.iter().map(|p| p.result.as_str()).collect();
    assert_eq!(
        results,
        vec!["Called Strike", "Swinging Strike", "Ball", "Swinging Strike", "Single"]
    );
    assert_eq!(view.pitches[0].pitch_name, "Four-Seam Fastball");
    assert_eq!(view.pitches[3].count, "1, 2");

    // Pitcher view: 4 FF / 3 SL / 2 CU overall, 2 / 2 / 1 against Trout.
    assert_eq!(
        view.pitcher_frequency.categories(),
        vec!["Curveball", "Four-Seam Fastball", "Slider"]
    );
    let ff = view.pitcher_frequency.row("Four-Seam Fastball").unwrap();
    assert!((ff.matchup - 0.4).abs() < 1e-9);
    assert!((ff.overall - 4.0 / 9.0).abs() < 1e-9);

    // Batter view includes the change-up Trout saw from someone else.
    assert_eq!(view.batter_frequency.len(), 4);
    assert_eq!(view.batter_frequency.row("Change-Up").unwrap().matchup, 0.0);
    assert!((view.batter_frequency.row("Slider").unwrap().overall - 3.0 / 8.0).abs() < 1e-9);

    assert!((view.zone.top - 3.494).abs() < 1e-9);
    assert!((view.zone.bottom - 1.624).abs() < 1e-9);

    h.quit().await;
}

#[tokio::test]
async fn zero_overlap_query_warns_without_failing() {
    let mut h = Harness::start(Arc::new(FixtureProvider::new()));
    h.select_matchup().await;
    // Both players pitched/batted in this window, but never against each other.
    let view = h.run_query(date(2019, 5, 9), date(2019, 5, 10)).await;

    assert!(view.pitches.is_empty());
    assert_eq!(view.warning.as_deref(), Some(NO_MATCHUPS));
    assert!(view.pitcher_frequency.is_empty());
    assert!(view.batter_frequency.is_empty());

    match h.recv().await {
        UiUpdate::Notice(n) => assert_eq!(n.text, NO_MATCHUPS),
        other => panic!("Expected Notice, got {:?}", other),
    }
    h.quit().await;
}

#[tokio::test]
async fn repeated_query_is_idempotent() {
    let mut h = Harness::start(Arc::new(FixtureProvider::new()));
    h.select_matchup().await;
    let first = h.run_query(date(2019, 4, 1), date(2019, 9, 30)).await;
    let second = h.run_query(date(2019, 4, 1), date(2019, 9, 30)).await;
    assert_eq!(first, second);
    h.quit().await;
}

#[tokio::test]
async fn count_filter_rederives_without_refetching() {
    let provider = Arc::new(FixtureProvider::new());
    let mut h = Harness::start(Arc::clone(&provider));
    h.select_matchup().await;
    let all = h.run_query(date(2019, 4, 1), date(2019, 9, 30)).await;
    let requests = provider.pitch_requests.load(Ordering::SeqCst);
    assert_eq!(requests, 2);

    let first_pitch = CountFilter {
        balls: Some(0),
        strikes: Some(0),
    };
    h.send(UserCommand::SetCountFilter(first_pitch)).await;
    let view = match h.recv().await {
        UiUpdate::MatchupReady(view) => *view,
        other => panic!("Expected MatchupReady, got {:?}", other),
    };

    assert_eq!(provider.pitch_requests.load(Ordering::SeqCst), requests);
    assert_eq!(view.filter, first_pitch);
    assert_eq!(view.pitches.len(), 2);
    assert!(view.pitches.iter().all(|p| p.pitch_name == "Four-Seam Fastball"));
    assert_eq!(view.zone, all.zone);

    // Kershaw's 0-0 pitches are all fastballs, so only that category remains.
    assert_eq!(view.pitcher_frequency.categories(), vec!["Four-Seam Fastball"]);
    assert_eq!(view.pitcher_frequency.row("Four-Seam Fastball").unwrap().matchup, 1.0);
    assert_eq!(view.batter_frequency.row("Four-Seam Fastball").unwrap().matchup, 1.0);

    h.send(UserCommand::SetCountFilter(CountFilter::default())).await;
    match h.recv().await {
        UiUpdate::MatchupReady(view) => assert_eq!(*view, all),
        other => panic!("Expected MatchupReady, got {:?}", other),
    }
    h.quit().await;
}

#[tokio::test]
async fn second_run_while_in_flight_is_rejected() {
    let gate = Arc::new(Semaphore::new(0));
    let mut provider = FixtureProvider::new();
    provider.gate = Some(Arc::clone(&gate));
    let mut h = Harness::start(Arc::new(provider));
    h.select_matchup().await;

    let (start, end) = (date(2019, 4, 1), date(2019, 9, 30));
    h.send(UserCommand::RunQuery { start, end }).await;
    assert_eq!(h.recv().await, UiUpdate::QueryRunning(true));

    h.send(UserCommand::RunQuery { start, end }).await;
    match h.recv().await {
        UiUpdate::Notice(n) => assert_eq!(n.text, QUERY_ALREADY_RUNNING),
        other => panic!("Expected Notice, got {:?}", other),
    }

    gate.add_permits(2);
    assert_eq!(h.recv().await, UiUpdate::QueryRunning(false));
    match h.recv().await {
        UiUpdate::MatchupReady(view) => assert_eq!(view.totals.matchup, 5),
        other => panic!("Expected MatchupReady, got {:?}", other),
    }
    h.quit().await;
}

#[tokio::test]
async fn retrieval_failure_surfaces_error_notice() {
    let mut provider = FixtureProvider::new();
    provider.fail_pitches = true;
    let mut h = Harness::start(Arc::new(provider));
    h.select_matchup().await;

    h.send(UserCommand::RunQuery {
        start: date(2019, 4, 1),
        end: date(2019, 9, 30),
    })
    .await;
    assert_eq!(h.recv().await, UiUpdate::QueryRunning(true));
    assert_eq!(h.recv().await, UiUpdate::QueryRunning(false));
    match h.recv().await {
        UiUpdate::Notice(n) => {
            assert_eq!(n.level, NoticeLevel::Error);
            assert!(n.text.contains("pitch_type"), "got {:?}", n.text);
        }
        other => panic!("Expected Notice, got {:?}", other),
    }
    h.quit().await;
}

#[tokio::test]
async fn run_without_players_is_rejected() {
    let mut h = Harness::start(Arc::new(FixtureProvider::new()));
    h.send(UserCommand::RunQuery {
        start: date(2019, 4, 1),
        end: date(2019, 9, 30),
    })
    .await;
    match h.recv().await {
        UiUpdate::Notice(n) => assert_eq!(n.text, SELECT_BOTH_PLAYERS),
        other => panic!("Expected Notice, got {:?}", other),
    }
    h.quit().await;
}

#[tokio::test]
async fn dates_before_tracking_window_are_rejected() {
    let provider = Arc::new(FixtureProvider::new());
    let mut h = Harness::start(Arc::clone(&provider));
    h.select_matchup().await;
    h.send(UserCommand::RunQuery {
        start: date(2016, 9, 1),
        end: date(2019, 9, 30),
    })
    .await;
    match h.recv().await {
        UiUpdate::Notice(n) => {
            assert_eq!(n.level, NoticeLevel::Warning);
            assert!(n.text.contains("earliest"), "got {:?}", n.text);
        }
        other => panic!("Expected Notice, got {:?}", other),
    }
    assert_eq!(provider.pitch_requests.load(Ordering::SeqCst), 0);
    h.quit().await;
}
