// TUI widget modules for each dashboard panel.

pub mod frequency;
pub mod pitch_list;
pub mod query_panel;
pub mod search_form;
pub mod status_bar;
pub mod zone_plot;

use ratatui::style::{Color, Modifier, Style};

use pitchview_baseball::pitch::PitchColor;

/// Border style for a panel: cyan and bold when it holds focus, `base`
/// otherwise.
pub fn focused_border_style(focused: bool, base: Style) -> Style {
    if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        base
    }
}

/// Terminal color for a pitch family. Black is drawn gray so it stays
/// visible on dark backgrounds.
pub fn pitch_color(color: PitchColor) -> Color {
    match color {
        PitchColor::Red => Color::Red,
        PitchColor::Blue => Color::Blue,
        PitchColor::Purple => Color::Magenta,
        PitchColor::Orange => Color::LightRed,
        PitchColor::Green => Color::Green,
        PitchColor::Black => Color::Gray,
    }
}

/// Whole-number percentage, e.g. `0.4` -> `"40%"`.
pub fn percent(share: f64) -> String {
    format!("{:.0}%", share * 100.0)
}

/// Two-decimal percentage, e.g. `0.4` -> `"40.00%"`.
pub fn percent_detail(share: f64) -> String {
    format!("{:.2}%", share * 100.0)
}
