// Pitch list widget: one row per plotted pitch with speed, result and count.
//
// The highlighted row is also marked on the strike zone plot.

use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use ratatui::Frame;

use pitchview_app::protocol::PlottedPitch;

use super::{focused_border_style, pitch_color};
use crate::{Focus, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let border = focused_border_style(state.focus == Focus::Pitches, Style::default());
    let pitches = &state.matchup.pitches;
    let title = format!("Pitches ({})", pitches.len());

    if pitches.is_empty() {
        let paragraph = Paragraph::new("  No pitches to show.")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(title),
            );
        frame.render_widget(paragraph, area);
        return;
    }

    // Visible row count: subtract 2 for borders
    let visible_rows = (area.height as usize).saturating_sub(2);
    let total = pitches.len();
    let selected = state.selected_pitch.unwrap_or(0).min(total - 1);
    let scroll_offset = scroll_offset(selected, total, visible_rows);

    let items: Vec<ListItem> = pitches
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_rows.max(1))
        .map(|(i, pitch)| format_pitch(i, pitch, state.selected_pitch == Some(i)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title),
    );
    frame.render_widget(list, area);

    // Render vertical scrollbar if content overflows
    if total > visible_rows {
        let mut scrollbar_state =
            ScrollbarState::new(total.saturating_sub(visible_rows)).position(scroll_offset);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

/// First visible row so that `selected` stays on screen.
pub fn scroll_offset(selected: usize, total: usize, visible: usize) -> usize {
    let visible = visible.max(1);
    let max_offset = total.saturating_sub(visible);
    (selected + 1).saturating_sub(visible).min(max_offset)
}

/// Velocity as `"93.1 mph"`, or `"-- mph"` when not tracked.
pub fn format_speed(speed: Option<f64>) -> String {
    speed.map_or_else(|| "-- mph".to_string(), |s| format!("{s:.1} mph"))
}

fn format_pitch(index: usize, pitch: &PlottedPitch, selected: bool) -> ListItem<'static> {
    let date = pitch
        .game_date
        .map_or_else(|| "----------".to_string(), |d| d.to_string());
    let row_style = if selected {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    ListItem::new(Line::from(vec![
        Span::styled(format!("{:>3} ", index + 1), Style::default().fg(Color::Gray)),
        Span::styled(format!("{date} "), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{:<19}", pitch.pitch_name),
            Style::default().fg(pitch_color(pitch.color)),
        ),
        Span::raw(format!("{:>9}  ", format_speed(pitch.speed))),
        Span::raw(format!("{:<22}", pitch.result)),
        Span::styled(format!("({})", pitch.count), Style::default().fg(Color::Gray)),
    ]))
    .style(row_style)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
