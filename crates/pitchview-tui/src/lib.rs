// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the search forms, query controls and the
// most recent matchup view. The app orchestrator pushes `UiUpdate` messages
// over an mpsc channel; the TUI applies them to `ViewState` and re-renders at
// ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{info, warn};

use pitchview_app::protocol::{MatchupView, Notice, Role, UiUpdate, UserCommand};
use pitchview_baseball::count::CountFilter;
use pitchview_baseball::register::PlayerIdentity;

use layout::{build_layout, AppLayout};

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

/// Which control receives keyboard input. Tab / Shift+Tab walk this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    PitcherFirst,
    PitcherLast,
    PitcherResults,
    BatterFirst,
    BatterLast,
    BatterResults,
    StartDate,
    EndDate,
    Balls,
    Strikes,
    Pitches,
}

const FOCUS_ORDER: [Focus; 11] = [
    Focus::PitcherFirst,
    Focus::PitcherLast,
    Focus::PitcherResults,
    Focus::BatterFirst,
    Focus::BatterLast,
    Focus::BatterResults,
    Focus::StartDate,
    Focus::EndDate,
    Focus::Balls,
    Focus::Strikes,
    Focus::Pitches,
];

impl Focus {
    fn index(self) -> usize {
        FOCUS_ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        FOCUS_ORDER[(self.index() + 1) % FOCUS_ORDER.len()]
    }

    pub fn prev(self) -> Self {
        FOCUS_ORDER[(self.index() + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len()]
    }

    /// The search form this focus belongs to, if any.
    pub fn role(self) -> Option<Role> {
        match self {
            Focus::PitcherFirst | Focus::PitcherLast | Focus::PitcherResults => Some(Role::Pitcher),
            Focus::BatterFirst | Focus::BatterLast | Focus::BatterResults => Some(Role::Batter),
            _ => None,
        }
    }

    /// Name inputs capture every printable key.
    pub fn is_text_input(self) -> bool {
        matches!(
            self,
            Focus::PitcherFirst | Focus::PitcherLast | Focus::BatterFirst | Focus::BatterLast
        )
    }
}

/// Which frequency chart is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyTab {
    Pitcher,
    Batter,
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Name inputs plus the latest results for one role.
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    pub first: String,
    pub last: String,
    pub results: Vec<PlayerIdentity>,
    pub selected: Option<usize>,
    pub searching: bool,
}

impl SearchForm {
    pub fn selected_player(&self) -> Option<&PlayerIdentity> {
        self.selected.and_then(|i| self.results.get(i))
    }
}

/// A date picker. `buffer` holds a date being typed, until committed.
#[derive(Debug, Clone)]
pub struct DateField {
    pub date: NaiveDate,
    pub buffer: Option<String>,
}

impl DateField {
    pub fn new(date: NaiveDate) -> Self {
        DateField { date, buffer: None }
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state rendered by `render_frame`.
///
/// Form inputs live here; search results, selection, query progress and the
/// derived matchup arrive as `UiUpdate` messages from the app orchestrator.
pub struct ViewState {
    pub pitcher: SearchForm,
    pub batter: SearchForm,
    pub start: DateField,
    pub end: DateField,
    /// Bounds for both date pickers.
    pub earliest: NaiveDate,
    pub today: NaiveDate,
    pub count_filter: CountFilter,
    pub focus: Focus,
    pub matchup: MatchupView,
    pub frequency_tab: FrequencyTab,
    /// Index into `matchup.pitches` highlighted on the plot.
    pub selected_pitch: Option<usize>,
    pub query_running: bool,
    pub notice: Option<Notice>,
}

impl ViewState {
    /// Both dates default to `today`.
    pub fn new(earliest: NaiveDate, today: NaiveDate) -> Self {
        ViewState {
            pitcher: SearchForm::default(),
            batter: SearchForm::default(),
            start: DateField::new(today),
            end: DateField::new(today),
            earliest,
            today,
            count_filter: CountFilter::default(),
            focus: Focus::PitcherFirst,
            matchup: MatchupView::empty(),
            frequency_tab: FrequencyTab::Pitcher,
            selected_pitch: None,
            query_running: false,
            notice: None,
        }
    }

    pub fn form(&self, role: Role) -> &SearchForm {
        match role {
            Role::Pitcher => &self.pitcher,
            Role::Batter => &self.batter,
        }
    }

    pub fn form_mut(&mut self, role: Role) -> &mut SearchForm {
        match role {
            Role::Pitcher => &mut self.pitcher,
            Role::Batter => &mut self.batter,
        }
    }

    /// True once any query has produced a view.
    pub fn has_matchup(&self) -> bool {
        !self.matchup.title.is_empty()
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::SearchStarted(role) => {
            state.form_mut(role).searching = true;
            let label = role.label().to_lowercase();
            state.notice = Some(Notice::info(format!("Searching {label}s...")));
        }
        UiUpdate::SearchResults { role, players } => {
            let n = players.len();
            let form = state.form_mut(role);
            form.searching = false;
            form.results = players;
            form.selected = Some(0);
            state.notice = Some(Notice::info(format!(
                "{} {} found",
                n,
                if n == 1 { "player" } else { "players" }
            )));
        }
        UiUpdate::Selection { role, index } => {
            let form = state.form_mut(role);
            if index < form.results.len() {
                form.selected = Some(index);
            }
        }
        UiUpdate::QueryRunning(running) => {
            state.query_running = running;
            if running {
                state.notice = Some(Notice::info("Gathering data..."));
            }
        }
        UiUpdate::MatchupReady(view) => {
            let len = view.pitches.len();
            state.selected_pitch = match state.selected_pitch {
                Some(i) if i < len => Some(i),
                _ if len > 0 => Some(0),
                _ => None,
            };
            state.count_filter = view.filter;
            state.matchup = *view;
            state.notice = None;
        }
        UiUpdate::SearchEnded(role) => {
            state.form_mut(role).searching = false;
        }
        UiUpdate::Notice(notice) => {
            state.notice = Some(notice);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete dashboard frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::search_form::render(frame, layout.pitcher_form, state, Role::Pitcher);
    widgets::search_form::render(frame, layout.batter_form, state, Role::Batter);
    widgets::query_panel::render(frame, layout.query_panel, state);
    widgets::zone_plot::render(frame, layout.zone_plot, state);
    widgets::frequency::render(frame, layout.frequency, state);
    widgets::pitch_list::render(frame, layout.pitch_list, state);
    render_help_bar(frame, &layout, state);
}

/// Key hints for the focused control.
pub fn help_text(focus: Focus) -> &'static str {
    match focus {
        f if f.is_text_input() => {
            " Type name | Enter:Search | Tab:Next field | Ctrl+R:Run | Ctrl+C:Quit"
        }
        Focus::PitcherResults | Focus::BatterResults => {
            " Up/Down:Choose player | Tab:Next | r:Run | t:Pitcher/Batter chart | q:Quit"
        }
        Focus::StartDate | Focus::EndDate => {
            " +/-:Day | >/<:Week | Type YYYY-MM-DD, Enter | r:Run | q:Quit"
        }
        Focus::Balls | Focus::Strikes => " Space/0-3/a:Set count | Tab:Next | r:Run | q:Quit",
        _ => " Up/Down:Select pitch | t:Pitcher/Batter chart | Tab:Next | r:Run | q:Quit",
    }
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        help_text(state.focus),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    earliest: NaiveDate,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Restore the terminal before the default hook prints the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        default_hook(panic_info);
    }));

    let mut view_state = ViewState::new(earliest, chrono::Local::now().date_naive());
    let mut event_stream = EventStream::new();

    // ~30fps
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => {
                        info!("UI channel closed, leaving TUI");
                        break;
                    }
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = matches!(cmd, UserCommand::Quit);
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse and resize events: the next tick redraws
                    }
                    Some(Err(e)) => {
                        warn!("Terminal input error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
