// Query panel widget: date range pickers, count filter, run state.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use pitchview_baseball::count::option_label;

use super::focused_border_style;
use crate::{DateField, Focus, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let focused = matches!(
        state.focus,
        Focus::StartDate | Focus::EndDate | Focus::Balls | Focus::Strikes
    );

    let lines = vec![
        field_line("Start  ", date_text(&state.start), state.focus == Focus::StartDate),
        field_line("End    ", date_text(&state.end), state.focus == Focus::EndDate),
        field_line("Balls  ", option_label(state.count_filter.balls), state.focus == Focus::Balls),
        field_line(
            "Strikes",
            option_label(state.count_filter.strikes),
            state.focus == Focus::Strikes,
        ),
        Line::raw(""),
        run_line(state.query_running),
        Line::styled(
            format!("  {} .. {}", state.earliest, state.today),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused_border_style(focused, Style::default()))
            .title("Query"),
    );
    frame.render_widget(paragraph, area);
}

/// The committed date, or the partial input with a cursor while typing.
pub fn date_text(field: &DateField) -> String {
    match &field.buffer {
        Some(buffer) => format!("{buffer}_"),
        None => field.date.format("%Y-%m-%d").to_string(),
    }
}

fn field_line(label: &'static str, value: String, focused: bool) -> Line<'static> {
    let value_style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::styled(format!(" {value} "), value_style),
    ])
}

fn run_line(running: bool) -> Line<'static> {
    if running {
        Line::styled(
            "  Gathering data...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    } else {
        Line::styled("  [r] Run query", Style::default().fg(Color::Green))
    }
}
