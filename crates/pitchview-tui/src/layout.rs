// Layout computation for the dashboard.
//
// Splits the terminal into: status bar, a row of input forms, the strike
// zone plot beside the frequency chart and pitch list, and a help bar.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Computed layout regions for the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub pitcher_form: Rect,
    pub batter_form: Rect,
    pub query_panel: Rect,
    pub zone_plot: Rect,
    pub frequency: Rect,
    pub pitch_list: Rect,
    pub help_bar: Rect,
}

/// Height of the search forms row: two name inputs plus a few results.
const FORMS_HEIGHT: u16 = 9;

/// Build the dashboard layout from the available terminal area.
///
/// ```text
/// +--------------------------------------------------+
/// | status bar                                       |
/// +----------------+----------------+----------------+
/// | pitcher search | batter search  | dates / count  |
/// +------------------------+-------------------------+
/// |                        | frequency chart         |
/// | strike zone plot       +-------------------------+
/// |                        | pitch list              |
/// +------------------------+-------------------------+
/// | help bar                                         |
/// +--------------------------------------------------+
/// ```
pub fn build_layout(area: Rect) -> AppLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(FORMS_HEIGHT),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(area);

    let forms = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
        ])
        .split(rows[1]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main[1]);

    AppLayout {
        status_bar: rows[0],
        pitcher_form: forms[0],
        batter_form: forms[1],
        query_panel: forms[2],
        zone_plot: main[0],
        frequency: right[0],
        pitch_list: right[1],
        help_bar: rows[3],
    }
}
