// Frequency chart widget: matchup vs. overall pitch-type share.
//
// One bar group per pitch type; gray bar = overall share, colored bar = share
// in the matchup. `t` switches between the pitcher and batter tables.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};
use ratatui::Frame;

use pitchview_baseball::frequency::{FrequencyRow, FrequencyTable};
use pitchview_baseball::pitch::color_for_name;

use super::{percent, percent_detail, pitch_color};
use crate::{FrequencyTab, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (table, total) = active_table(state);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(tab_title(state.frequency_tab));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if table.is_empty() {
        let text = if state.has_matchup() {
            "  No pitches for this count."
        } else {
            "  Run a query to see pitch mix."
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    frame.render_widget(bar_chart(table), chunks[0]);
    frame.render_widget(Paragraph::new(detail_line(state, table, total)), chunks[1]);
}

/// The table for the active tab and the matchup pitch count behind it.
fn active_table(state: &ViewState) -> (&FrequencyTable, usize) {
    let view = &state.matchup;
    match state.frequency_tab {
        FrequencyTab::Pitcher => (&view.pitcher_frequency, view.totals.matchup),
        FrequencyTab::Batter => (&view.batter_frequency, view.totals.batter_matchup),
    }
}

pub fn tab_title(tab: FrequencyTab) -> Line<'static> {
    let active = Style::default()
        .fg(Color::Black)
        .bg(Color::White)
        .add_modifier(Modifier::BOLD);
    let inactive = Style::default().fg(Color::White);
    let (pitcher, batter) = match tab {
        FrequencyTab::Pitcher => (active, inactive),
        FrequencyTab::Batter => (inactive, active),
    };
    Line::from(vec![
        Span::raw(" Pitch mix "),
        Span::styled("[Pitcher]", pitcher),
        Span::raw(" "),
        Span::styled("[Batter]", batter),
        Span::raw(" "),
    ])
}

/// Whole-percent bar value.
pub fn bar_value(share: f64) -> u64 {
    (share * 100.0).round().clamp(0.0, 100.0) as u64
}

fn bar_chart(table: &FrequencyTable) -> BarChart<'_> {
    let mut chart = BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(1)
        .max(100);

    for row in &table.rows {
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(row.category.as_str()))
                .bars(&row_bars(row)),
        );
    }
    chart
}

fn row_bars(row: &FrequencyRow) -> [Bar<'static>; 2] {
    let color = pitch_color(color_for_name(&row.category));
    let overall = Bar::default()
        .value(bar_value(row.overall))
        .text_value(format!("{} overall", percent(row.overall)))
        .style(Style::default().fg(Color::DarkGray));
    let matchup = Bar::default()
        .value(bar_value(row.matchup))
        .text_value(format!("{} matchup", percent(row.matchup)))
        .style(Style::default().fg(color));
    [overall, matchup]
}

/// Two-decimal detail for the highlighted pitch type, or the matchup total.
fn detail_line(state: &ViewState, table: &FrequencyTable, total: usize) -> Line<'static> {
    let highlighted = state
        .selected_pitch
        .and_then(|i| state.matchup.pitches.get(i))
        .and_then(|p| table.row(p.pitch_name));

    match highlighted {
        Some(row) => Line::from(vec![
            Span::styled(
                format!("{}: ", row.category),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "matchup {} | overall {}",
                percent_detail(row.matchup),
                percent_detail(row.overall)
            )),
        ]),
        None => Line::styled(
            format!("{total} matchup pitches"),
            Style::default().fg(Color::Gray),
        ),
    }
}
