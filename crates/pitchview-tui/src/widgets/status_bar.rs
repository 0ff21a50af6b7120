// Status bar widget: app name, query indicator, current notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use pitchview_app::protocol::{Notice, NoticeLevel};

use crate::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [app name] [query indicator] [count filter] [notice]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        " Pitchview ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];

    let (dot, dot_color) = query_indicator(state.query_running);
    spans.push(Span::styled(format!(" {} ", dot), Style::default().fg(dot_color)));

    spans.push(Span::styled(
        state.count_filter.to_string(),
        Style::default().fg(Color::White),
    ));

    if let Some(notice) = &state.notice {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(notice_span(notice));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Yellow while a query is in flight, green when idle.
pub fn query_indicator(running: bool) -> (&'static str, Color) {
    if running {
        ("●", Color::Yellow)
    } else {
        ("●", Color::Green)
    }
}

pub fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Info => Color::White,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    }
}

fn notice_span(notice: &Notice) -> Span<'static> {
    let mut style = Style::default().fg(notice_color(notice.level));
    if notice.level != NoticeLevel::Info {
        style = style.add_modifier(Modifier::BOLD);
    }
    Span::styled(notice.text.clone(), style)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
