// Keyboard input handling.
//
// Maps crossterm KeyEvents to UserCommands or local ViewState changes
// (focus, text entry, date stepping, pitch highlight).

use chrono::{Days, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use pitchview_app::protocol::{Notice, Role, UserCommand};

use crate::{DateField, Focus, FrequencyTab, ViewState};

/// Max length of a typed date: `YYYY-MM-DD`.
const DATE_INPUT_LEN: usize = 10;

/// Process a key event and return an optional UserCommand.
///
/// Local view changes (focus, typing, date stepping, highlighted pitch) are
/// applied directly to `state`. Commands that need the app orchestrator
/// (search, selection, query, count filter, quit) are returned.
pub fn handle_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    // Only react to key press events (ignore release/repeat)
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    match key_event.code {
        KeyCode::Char('c') if ctrl => return Some(UserCommand::Quit),
        KeyCode::Char('r') if ctrl => return run_query(state),
        KeyCode::Tab => {
            leave_focus(state);
            state.focus = state.focus.next();
            return None;
        }
        KeyCode::BackTab => {
            leave_focus(state);
            state.focus = state.focus.prev();
            return None;
        }
        _ => {}
    }

    match state.focus {
        Focus::PitcherFirst => handle_name_key(key_event, state, Role::Pitcher, NameField::First),
        Focus::PitcherLast => handle_name_key(key_event, state, Role::Pitcher, NameField::Last),
        Focus::BatterFirst => handle_name_key(key_event, state, Role::Batter, NameField::First),
        Focus::BatterLast => handle_name_key(key_event, state, Role::Batter, NameField::Last),
        Focus::PitcherResults => handle_results_key(key_event, state, Role::Pitcher),
        Focus::BatterResults => handle_results_key(key_event, state, Role::Batter),
        Focus::StartDate => handle_date_key(key_event, state, DateSlot::Start),
        Focus::EndDate => handle_date_key(key_event, state, DateSlot::End),
        Focus::Balls | Focus::Strikes => handle_filter_key(key_event, state),
        Focus::Pitches => handle_pitches_key(key_event, state),
    }
}

/// Keys shared by every control that does not capture text.
fn handle_common_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('q') => Some(UserCommand::Quit),
        KeyCode::Char('r') => run_query(state),
        KeyCode::Char('t') => {
            state.frequency_tab = match state.frequency_tab {
                FrequencyTab::Pitcher => FrequencyTab::Batter,
                FrequencyTab::Batter => FrequencyTab::Pitcher,
            };
            None
        }
        KeyCode::Esc => {
            state.notice = None;
            None
        }
        _ => None,
    }
}

fn run_query(state: &mut ViewState) -> Option<UserCommand> {
    leave_focus(state);
    Some(UserCommand::RunQuery {
        start: state.start.date,
        end: state.end.date,
    })
}

/// Commit any date being typed in the control losing focus.
fn leave_focus(state: &mut ViewState) {
    match state.focus {
        Focus::StartDate => commit_date(state, DateSlot::Start),
        Focus::EndDate => commit_date(state, DateSlot::End),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Name fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum NameField {
    First,
    Last,
}

fn handle_name_key(
    key_event: KeyEvent,
    state: &mut ViewState,
    role: Role,
    field: NameField,
) -> Option<UserCommand> {
    let form = state.form_mut(role);
    let text = match field {
        NameField::First => &mut form.first,
        NameField::Last => &mut form.last,
    };

    match key_event.code {
        KeyCode::Char(c) => {
            text.push(c);
            None
        }
        KeyCode::Backspace => {
            text.pop();
            None
        }
        KeyCode::Esc => {
            text.clear();
            None
        }
        KeyCode::Enter => Some(UserCommand::Search {
            role,
            first: form.first.clone(),
            last: form.last.clone(),
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

fn handle_results_key(
    key_event: KeyEvent,
    state: &mut ViewState,
    role: Role,
) -> Option<UserCommand> {
    let form = state.form(role);
    let len = form.results.len();
    let current = form.selected.unwrap_or(0);

    let index = match key_event.code {
        KeyCode::Up | KeyCode::Char('k') if len > 0 => (current + len - 1) % len,
        KeyCode::Down | KeyCode::Char('j') if len > 0 => (current + 1) % len,
        _ => return handle_common_key(key_event, state),
    };
    Some(UserCommand::SelectPlayer { role, index })
}

// ---------------------------------------------------------------------------
// Date pickers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum DateSlot {
    Start,
    End,
}

fn date_field(state: &mut ViewState, slot: DateSlot) -> &mut DateField {
    match slot {
        DateSlot::Start => &mut state.start,
        DateSlot::End => &mut state.end,
    }
}

fn handle_date_key(
    key_event: KeyEvent,
    state: &mut ViewState,
    slot: DateSlot,
) -> Option<UserCommand> {
    if let Some(buffer) = date_field(state, slot).buffer.as_mut() {
        match key_event.code {
            KeyCode::Char(c)
                if (c.is_ascii_digit() || c == '-') && buffer.len() < DATE_INPUT_LEN =>
            {
                buffer.push(c);
            }
            KeyCode::Backspace => {
                buffer.pop();
                if buffer.is_empty() {
                    date_field(state, slot).buffer = None;
                }
            }
            KeyCode::Enter => commit_date(state, slot),
            KeyCode::Esc => date_field(state, slot).buffer = None,
            _ => {}
        }
        return None;
    }

    match key_event.code {
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => step_date(state, slot, 1),
        KeyCode::Char('-') | KeyCode::Left => step_date(state, slot, -1),
        KeyCode::Char('>') | KeyCode::Char('.') => step_date(state, slot, 7),
        KeyCode::Char('<') | KeyCode::Char(',') => step_date(state, slot, -7),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            date_field(state, slot).buffer = Some(c.to_string());
        }
        KeyCode::Enter => return run_query(state),
        _ => return handle_common_key(key_event, state),
    }
    None
}

/// Move a date by `days`, clamped to `[earliest, today]`.
fn step_date(state: &mut ViewState, slot: DateSlot, days: i64) {
    let (earliest, today) = (state.earliest, state.today);
    let field = date_field(state, slot);
    let stepped = if days >= 0 {
        field.date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        field.date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    if let Some(date) = stepped {
        field.date = date.clamp(earliest, today);
    }
}

/// Parse the typed buffer into the field. Out-of-bounds or malformed input
/// keeps the previous date and raises a notice.
fn commit_date(state: &mut ViewState, slot: DateSlot) {
    let Some(buffer) = date_field(state, slot).buffer.take() else {
        return;
    };
    match NaiveDate::parse_from_str(&buffer, "%Y-%m-%d") {
        Ok(date) if date < state.earliest || date > state.today => {
            state.notice = Some(Notice::warning(format!(
                "Dates must fall between {} and {}",
                state.earliest, state.today
            )));
        }
        Ok(date) => date_field(state, slot).date = date,
        Err(_) => {
            state.notice = Some(Notice::warning(format!("Not a date: {buffer} (use YYYY-MM-DD)")));
        }
    }
}

// ---------------------------------------------------------------------------
// Count filter
// ---------------------------------------------------------------------------

fn handle_filter_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    let balls = state.focus == Focus::Balls;
    let mut filter = state.count_filter;

    match key_event.code {
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Right => {
            if balls {
                filter.cycle_balls();
            } else {
                filter.cycle_strikes();
            }
        }
        KeyCode::Char('a') => {
            if balls {
                filter.balls = None;
            } else {
                filter.strikes = None;
            }
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let value = c as u8 - b'0';
            let max = if balls {
                pitchview_baseball::count::MAX_BALLS
            } else {
                pitchview_baseball::count::MAX_STRIKES
            };
            if value > max {
                return None;
            }
            if balls {
                filter.balls = Some(value);
            } else {
                filter.strikes = Some(value);
            }
        }
        _ => return handle_common_key(key_event, state),
    }

    state.count_filter = filter;
    Some(UserCommand::SetCountFilter(filter))
}

// ---------------------------------------------------------------------------
// Pitch list
// ---------------------------------------------------------------------------

fn handle_pitches_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    let len = state.matchup.pitches.len();
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') if len > 0 => {
            state.selected_pitch = Some(state.selected_pitch.map_or(0, |i| i.saturating_sub(1)));
            None
        }
        KeyCode::Down | KeyCode::Char('j') if len > 0 => {
            state.selected_pitch = Some(state.selected_pitch.map_or(0, |i| (i + 1).min(len - 1)));
            None
        }
        KeyCode::Home if len > 0 => {
            state.selected_pitch = Some(0);
            None
        }
        KeyCode::End if len > 0 => {
            state.selected_pitch = Some(len - 1);
            None
        }
        _ => handle_common_key(key_event, state),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
