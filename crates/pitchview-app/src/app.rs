// Session state and orchestration logic.
//
// The central event loop that turns user commands from the TUI into player
// searches and matchup queries, runs those against the statistics provider
// in spawned tasks, and pushes UI updates back to the TUI render loop.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use pitchview_baseball::count::CountFilter;
use pitchview_baseball::register::PlayerIdentity;

use crate::config::Config;
use crate::matchup::{MatchupData, NO_MATCHUPS};
use crate::protocol::{Notice, Role, UiUpdate, UserCommand};
use crate::provider::{DateRange, FetchError, StatsProvider};

pub const NO_PLAYERS_FOUND: &str = "No players found";
pub const QUERY_ALREADY_RUNNING: &str = "Query already running";
pub const SELECT_BOTH_PLAYERS: &str = "Select a pitcher and a batter first";

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Results of a spawned search or query, sent back to the event loop.
///
/// Every event carries the generation counter that was current when its task
/// was spawned; events from older generations are discarded.
#[derive(Debug)]
pub enum TaskEvent {
    SearchDone {
        role: Role,
        key: SearchKey,
        generation: u64,
        result: Result<Vec<PlayerIdentity>, FetchError>,
    },
    QueryDone {
        generation: u64,
        result: Result<MatchupData, FetchError>,
    },
}

/// Normalized (first, last) name used to cache searches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub first: String,
    pub last: String,
}

impl SearchKey {
    pub fn new(first: &str, last: &str) -> Self {
        SearchKey {
            first: first.trim().to_lowercase(),
            last: last.trim().to_lowercase(),
        }
    }
}

/// Search results and selection for one side of the matchup.
#[derive(Debug, Default)]
pub struct RoleSlot {
    pub results: Vec<PlayerIdentity>,
    pub selected: Option<usize>,
    search_generation: u64,
}

impl RoleSlot {
    pub fn player(&self) -> Option<&PlayerIdentity> {
        self.selected.and_then(|i| self.results.get(i))
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// All state owned by the orchestrator for one dashboard session.
pub struct Session {
    pub config: Config,
    provider: Arc<dyn StatsProvider>,
    /// Searches survive across queries; keyed by normalized name, shared by
    /// both roles.
    search_cache: HashMap<SearchKey, Vec<PlayerIdentity>>,
    pub pitcher: RoleSlot,
    pub batter: RoleSlot,
    pub count_filter: CountFilter,
    /// Data for the most recent successful query.
    pub matchup: Option<MatchupData>,
    /// Incremented each time a query task is spawned.
    pub query_generation: u64,
    pub query_in_flight: bool,
    current_query: Option<tokio::task::JoinHandle<()>>,
    task_tx: mpsc::Sender<TaskEvent>,
}

impl Session {
    pub fn new(
        config: Config,
        provider: Arc<dyn StatsProvider>,
        task_tx: mpsc::Sender<TaskEvent>,
    ) -> Self {
        Session {
            config,
            provider,
            search_cache: HashMap::new(),
            pitcher: RoleSlot::default(),
            batter: RoleSlot::default(),
            count_filter: CountFilter::default(),
            matchup: None,
            query_generation: 0,
            query_in_flight: false,
            current_query: None,
            task_tx,
        }
    }

    pub fn slot(&self, role: Role) -> &RoleSlot {
        match role {
            Role::Pitcher => &self.pitcher,
            Role::Batter => &self.batter,
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut RoleSlot {
        match role {
            Role::Pitcher => &mut self.pitcher,
            Role::Batter => &mut self.batter,
        }
    }

    pub fn cached_search(&self, first: &str, last: &str) -> Option<&[PlayerIdentity]> {
        self.search_cache
            .get(&SearchKey::new(first, last))
            .map(Vec::as_slice)
    }

    /// Spawn a name search for `role`. Returns the generation it was tagged
    /// with.
    pub fn start_search(&mut self, role: Role, key: SearchKey) -> u64 {
        let generation = self.supersede_search(role);

        let provider = Arc::clone(&self.provider);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = provider.search_players(&key.first, &key.last).await;
            let _ = tx
                .send(TaskEvent::SearchDone {
                    role,
                    key,
                    generation,
                    result,
                })
                .await;
        });

        info!("Started {} search (gen: {})", role.label(), generation);
        generation
    }

    /// Advance the search generation for `role` so that any search still in
    /// flight for it is discarded when it completes.
    pub fn supersede_search(&mut self, role: Role) -> u64 {
        let slot = self.slot_mut(role);
        slot.search_generation += 1;
        slot.search_generation
    }

    /// Replace the results for `role`, selecting the first. Empty results
    /// leave the previous results and selection untouched.
    pub fn apply_search_results(&mut self, role: Role, players: Vec<PlayerIdentity>) -> bool {
        if players.is_empty() {
            return false;
        }
        let slot = self.slot_mut(role);
        slot.results = players;
        slot.selected = Some(0);
        true
    }

    pub fn select_player(&mut self, role: Role, index: usize) -> bool {
        let slot = self.slot_mut(role);
        if index < slot.results.len() {
            slot.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Validate a query request and spawn the fetch task.
    ///
    /// Returns the notice to show when the request is rejected: a query is
    /// already running, a player is not selected, or the range is invalid.
    pub fn start_query(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<u64, Notice> {
        if self.query_in_flight {
            return Err(Notice::warning(QUERY_ALREADY_RUNNING));
        }
        let (Some(pitcher), Some(batter)) = (self.pitcher.player(), self.batter.player()) else {
            return Err(Notice::warning(SELECT_BOTH_PLAYERS));
        };
        let range = DateRange::new(start, end, self.config.dates.earliest, today)
            .map_err(|e| Notice::warning(format!("Invalid date range: {e}")))?;

        let pitcher = pitcher.clone();
        let batter = batter.clone();

        self.query_generation += 1;
        let generation = self.query_generation;
        self.query_in_flight = true;

        info!(
            "Querying {} vs. {} from {} to {} (gen: {})",
            pitcher.label,
            batter.label,
            range.start(),
            range.end(),
            generation
        );

        let provider = Arc::clone(&self.provider);
        let tx = self.task_tx.clone();
        let handle = tokio::spawn(async move {
            let result = fetch_matchup(provider.as_ref(), pitcher, batter, range).await;
            let _ = tx.send(TaskEvent::QueryDone { generation, result }).await;
        });
        self.current_query = Some(handle);

        Ok(generation)
    }

    /// Abort the in-flight query, if any. Its result, should it still
    /// arrive, is discarded by the generation check.
    pub fn cancel_query(&mut self) {
        if let Some(handle) = self.current_query.take() {
            handle.abort();
            self.query_generation += 1;
            self.query_in_flight = false;
            info!("Cancelled in-flight query");
        }
    }
}

/// Fetch both players' pitches concurrently and derive the matchup.
async fn fetch_matchup(
    provider: &dyn StatsProvider,
    pitcher: PlayerIdentity,
    batter: PlayerIdentity,
    range: DateRange,
) -> Result<MatchupData, FetchError> {
    let (pitcher_pitches, batter_pitches) = tokio::try_join!(
        provider.pitches_by_pitcher(pitcher.id, range),
        provider.pitches_faced_by_batter(batter.id, range),
    )?;
    debug!(
        "Fetched {} pitcher pitches, {} batter pitches",
        pitcher_pitches.len(),
        batter_pitches.len()
    );
    Ok(MatchupData::new(
        pitcher,
        batter,
        range,
        pitcher_pitches,
        batter_pitches,
    ))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. Results from spawned search and query tasks
/// 2. User commands from the TUI
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut task_rx: mpsc::Receiver<TaskEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut session: Session,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    // The session holds a task sender, so this channel only closes if the
    // session is torn down; guard anyway so select! never spins on it.
    let mut tasks_open = true;

    loop {
        tokio::select! {
            // --- Task results ---
            event = task_rx.recv(), if tasks_open => {
                match event {
                    Some(event) => handle_task_event(&mut session, event, &ui_tx).await,
                    None => {
                        info!("Task channel closed");
                        tasks_open = false;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => handle_user_command(&mut session, cmd, &ui_tx).await,
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    session.cancel_query();
    info!("Application event loop exiting");
    Ok(())
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    session: &mut Session,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Search { role, first, last } => {
            if last.trim().is_empty() {
                let _ = ui_tx
                    .send(UiUpdate::Notice(Notice::warning("Enter a last name to search")))
                    .await;
                return;
            }
            if let Some(players) = session.cached_search(&first, &last) {
                debug!("Search cache hit for {:?} {:?}", first, last);
                let players = players.to_vec();
                session.supersede_search(role);
                publish_search_results(session, role, players, ui_tx).await;
                return;
            }
            session.start_search(role, SearchKey::new(&first, &last));
            let _ = ui_tx.send(UiUpdate::SearchStarted(role)).await;
        }
        UserCommand::SelectPlayer { role, index } => {
            if session.select_player(role, index) {
                let _ = ui_tx.send(UiUpdate::Selection { role, index }).await;
            } else {
                warn!("Ignoring out-of-range {} selection {}", role.label(), index);
            }
        }
        UserCommand::RunQuery { start, end } => {
            match session.start_query(start, end, today()) {
                Ok(_) => {
                    let _ = ui_tx.send(UiUpdate::QueryRunning(true)).await;
                }
                Err(notice) => {
                    info!("Query rejected: {}", notice.text);
                    let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
                }
            }
        }
        UserCommand::SetCountFilter(filter) => {
            session.count_filter = filter;
            info!("Count filter set to {}", filter);
            if let Some(data) = &session.matchup {
                let view = data.view(filter);
                let _ = ui_tx.send(UiUpdate::MatchupReady(Box::new(view))).await;
            }
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

/// Handle the result of a spawned search or query.
async fn handle_task_event(
    session: &mut Session,
    event: TaskEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match event {
        TaskEvent::SearchDone {
            role,
            key,
            generation,
            result,
        } => {
            if generation != session.slot(role).search_generation {
                debug!(
                    "Discarding stale {} search (event gen: {}, current gen: {})",
                    role.label(),
                    generation,
                    session.slot(role).search_generation
                );
                return;
            }
            match result {
                Ok(players) => {
                    info!(
                        "{} search for {:?} {:?}: {} result(s)",
                        role.label(),
                        key.first,
                        key.last,
                        players.len()
                    );
                    session.search_cache.insert(key, players.clone());
                    publish_search_results(session, role, players, ui_tx).await;
                }
                Err(e) => {
                    warn!("{} search failed: {}", role.label(), e);
                    let _ = ui_tx.send(UiUpdate::SearchEnded(role)).await;
                    let _ = ui_tx
                        .send(UiUpdate::Notice(Notice::error(format!(
                            "Player search failed: {e}"
                        ))))
                        .await;
                }
            }
        }
        TaskEvent::QueryDone { generation, result } => {
            if generation != session.query_generation {
                debug!(
                    "Discarding stale query result (event gen: {}, current gen: {})",
                    generation, session.query_generation
                );
                return;
            }
            session.query_in_flight = false;
            session.current_query = None;
            let _ = ui_tx.send(UiUpdate::QueryRunning(false)).await;

            match result {
                Ok(data) => {
                    info!(
                        "Data gathered: {} matchup pitches for {}",
                        data.matchup_len(),
                        data.title()
                    );
                    let view = data.view(session.count_filter);
                    let empty = data.is_empty();
                    session.matchup = Some(data);
                    let _ = ui_tx.send(UiUpdate::MatchupReady(Box::new(view))).await;
                    if empty {
                        let _ = ui_tx
                            .send(UiUpdate::Notice(Notice::warning(NO_MATCHUPS)))
                            .await;
                    }
                }
                Err(e) => {
                    warn!("Matchup query failed: {}", e);
                    let _ = ui_tx
                        .send(UiUpdate::Notice(Notice::error(format!(
                            "Data retrieval failed: {e}"
                        ))))
                        .await;
                }
            }
        }
    }
}

async fn publish_search_results(
    session: &mut Session,
    role: Role,
    players: Vec<PlayerIdentity>,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if session.apply_search_results(role, players.clone()) {
        let _ = ui_tx.send(UiUpdate::SearchResults { role, players }).await;
    } else {
        let _ = ui_tx.send(UiUpdate::SearchEnded(role)).await;
        let _ = ui_tx
            .send(UiUpdate::Notice(Notice::warning(NO_PLAYERS_FOUND)))
            .await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatesConfig, RegisterConfig, SavantConfig};
    use crate::protocol::NoticeLevel;
    use async_trait::async_trait;
    use pitchview_baseball::record::PitchRecord;

    /// Provider with a fixed roster and no pitch data.
    struct RosterOnly;

    #[async_trait]
    impl StatsProvider for RosterOnly {
        async fn search_players(
            &self,
            first: &str,
            last: &str,
        ) -> Result<Vec<PlayerIdentity>, FetchError> {
            let all = [
                (477132, "clayton", "kershaw", "Clayton Kershaw - 477132"),
                (545361, "mike", "trout", "Mike Trout - 545361"),
            ];
            Ok(all
                .iter()
                .filter(|(_, f, l, _)| *l == last && (first.is_empty() || *f == first))
                .map(|(id, _, _, label)| PlayerIdentity {
                    id: *id,
                    label: label.to_string(),
                })
                .collect())
        }

        async fn pitches_by_pitcher(
            &self,
            _id: u64,
            _range: DateRange,
        ) -> Result<Vec<PitchRecord>, FetchError> {
            Ok(vec![])
        }

        async fn pitches_faced_by_batter(
            &self,
            _id: u64,
            _range: DateRange,
        ) -> Result<Vec<PitchRecord>, FetchError> {
            Ok(vec![])
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_config() -> Config {
        Config {
            savant: SavantConfig {
                base_url: "http://localhost/statcast_search/csv".into(),
                timeout_secs: 5,
            },
            register: RegisterConfig {
                base_url: "http://localhost/register".into(),
                shards: "0".into(),
                cache_file: "player-register.csv".into(),
            },
            dates: DatesConfig {
                earliest: date(2017, 4, 1),
            },
        }
    }

    fn create_test_session() -> (Session, mpsc::Receiver<TaskEvent>) {
        let (task_tx, task_rx) = mpsc::channel(16);
        (Session::new(test_config(), Arc::new(RosterOnly), task_tx), task_rx)
    }

    fn kershaw() -> PlayerIdentity {
        PlayerIdentity {
            id: 477132,
            label: "Clayton Kershaw - 477132".into(),
        }
    }

    fn trout() -> PlayerIdentity {
        PlayerIdentity {
            id: 545361,
            label: "Mike Trout - 545361".into(),
        }
    }

    #[test]
    fn search_key_normalizes_case_and_whitespace() {
        assert_eq!(SearchKey::new(" Mike ", "TROUT"), SearchKey::new("mike", "trout"));
    }

    #[tokio::test]
    async fn empty_results_keep_previous_selection() {
        let (mut session, _rx) = create_test_session();
        assert!(session.apply_search_results(Role::Pitcher, vec![kershaw()]));
        assert!(!session.apply_search_results(Role::Pitcher, vec![]));
        assert_eq!(session.pitcher.player(), Some(&kershaw()));
    }

    #[tokio::test]
    async fn select_player_rejects_out_of_range() {
        let (mut session, _rx) = create_test_session();
        session.apply_search_results(Role::Batter, vec![trout(), kershaw()]);
        assert!(session.select_player(Role::Batter, 1));
        assert_eq!(session.batter.player(), Some(&kershaw()));
        assert!(!session.select_player(Role::Batter, 2));
        assert_eq!(session.batter.selected, Some(1));
    }

    #[tokio::test]
    async fn query_requires_both_players() {
        let (mut session, _rx) = create_test_session();
        session.apply_search_results(Role::Pitcher, vec![kershaw()]);
        let notice = session
            .start_query(date(2019, 4, 1), date(2019, 5, 1), date(2024, 1, 1))
            .unwrap_err();
        assert_eq!(notice.text, SELECT_BOTH_PLAYERS);
        assert!(!session.query_in_flight);
    }

    #[tokio::test]
    async fn query_rejects_invalid_range() {
        let (mut session, _rx) = create_test_session();
        session.apply_search_results(Role::Pitcher, vec![kershaw()]);
        session.apply_search_results(Role::Batter, vec![trout()]);
        let notice = session
            .start_query(date(2019, 5, 1), date(2019, 4, 1), date(2024, 1, 1))
            .unwrap_err();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.text.starts_with("Invalid date range"));
        assert_eq!(session.query_generation, 0);
    }

    #[tokio::test]
    async fn second_query_rejected_while_first_in_flight() {
        let (mut session, mut rx) = create_test_session();
        session.apply_search_results(Role::Pitcher, vec![kershaw()]);
        session.apply_search_results(Role::Batter, vec![trout()]);

        let gen = session
            .start_query(date(2019, 4, 1), date(2019, 5, 1), date(2024, 1, 1))
            .unwrap();
        assert_eq!(gen, 1);
        let notice = session
            .start_query(date(2019, 4, 1), date(2019, 5, 1), date(2024, 1, 1))
            .unwrap_err();
        assert_eq!(notice.text, QUERY_ALREADY_RUNNING);

        match rx.recv().await.unwrap() {
            TaskEvent::QueryDone { generation, result } => {
                assert_eq!(generation, 1);
                assert!(result.unwrap().is_empty());
            }
            other => panic!("Expected QueryDone, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn event_loop_handles_quit_command() {
        let (session, task_rx) = create_test_session();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, _ui_rx) = mpsc::channel(64);

        let handle = tokio::spawn(run(task_rx, cmd_rx, ui_tx, session));
        cmd_tx.send(UserCommand::Quit).await.unwrap();

        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn event_loop_searches_and_caches() {
        let (session, task_rx) = create_test_session();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(run(task_rx, cmd_rx, ui_tx, session));

        cmd_tx
            .send(UserCommand::Search {
                role: Role::Pitcher,
                first: String::new(),
                last: "Kershaw".into(),
            })
            .await
            .unwrap();
        assert_eq!(ui_rx.recv().await.unwrap(), UiUpdate::SearchStarted(Role::Pitcher));
        match ui_rx.recv().await.unwrap() {
            UiUpdate::SearchResults { role, players } => {
                assert_eq!(role, Role::Pitcher);
                assert_eq!(players, vec![kershaw()]);
            }
            other => panic!("Expected SearchResults, got {:?}", other),
        }

        // Same name for the other role is served from the cache: no
        // SearchStarted.
        cmd_tx
            .send(UserCommand::Search {
                role: Role::Batter,
                first: " ".into(),
                last: "KERSHAW".into(),
            })
            .await
            .unwrap();
        match ui_rx.recv().await.unwrap() {
            UiUpdate::SearchResults { role, .. } => assert_eq!(role, Role::Batter),
            other => panic!("Expected cached SearchResults, got {:?}", other),
        }

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn event_loop_reports_no_players_found() {
        let (session, task_rx) = create_test_session();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(run(task_rx, cmd_rx, ui_tx, session));

        cmd_tx
            .send(UserCommand::Search {
                role: Role::Batter,
                first: String::new(),
                last: "nobody".into(),
            })
            .await
            .unwrap();
        assert_eq!(ui_rx.recv().await.unwrap(), UiUpdate::SearchStarted(Role::Batter));
        assert_eq!(ui_rx.recv().await.unwrap(), UiUpdate::SearchEnded(Role::Batter));
        assert_eq!(
            ui_rx.recv().await.unwrap(),
            UiUpdate::Notice(Notice::warning(NO_PLAYERS_FOUND))
        );

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn blank_last_name_is_rejected_without_search() {
        let (session, task_rx) = create_test_session();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(run(task_rx, cmd_rx, ui_tx, session));

        cmd_tx
            .send(UserCommand::Search {
                role: Role::Pitcher,
                first: "Clayton".into(),
                last: "   ".into(),
            })
            .await
            .unwrap();
        match ui_rx.recv().await.unwrap() {
            UiUpdate::Notice(n) => assert_eq!(n.level, NoticeLevel::Warning),
            other => panic!("Expected Notice, got {:?}", other),
        }

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn stale_query_result_is_discarded() {
        let (mut session, _rx) = create_test_session();
        let (ui_tx, mut ui_rx) = mpsc::channel(16);
        session.query_generation = 3;
        session.query_in_flight = true;

        handle_task_event(
            &mut session,
            TaskEvent::QueryDone {
                generation: 2,
                result: Ok(MatchupData::new(
                    kershaw(),
                    trout(),
                    DateRange::new(
                        date(2019, 4, 1),
                        date(2019, 4, 2),
                        date(2017, 4, 1),
                        date(2024, 1, 1),
                    )
                    .unwrap(),
                    vec![],
                    vec![],
                )),
            },
            &ui_tx,
        )
        .await;

        assert!(session.matchup.is_none());
        assert!(session.query_in_flight);
        assert!(ui_rx.try_recv().is_err());
    }
}
