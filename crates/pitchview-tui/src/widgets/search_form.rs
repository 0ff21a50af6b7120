// Search form widget: name inputs and result selector for one role.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use pitchview_app::protocol::Role;

use super::focused_border_style;
use crate::{Focus, SearchForm, ViewState};

/// Lines above the result list: first name, last name.
const INPUT_LINES: usize = 2;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, role: Role) {
    let form = state.form(role);
    let (first_focus, last_focus, results_focus) = match role {
        Role::Pitcher => (Focus::PitcherFirst, Focus::PitcherLast, Focus::PitcherResults),
        Role::Batter => (Focus::BatterFirst, Focus::BatterLast, Focus::BatterResults),
    };

    let mut lines = vec![
        input_line("First", &form.first, state.focus == first_focus),
        input_line("Last ", &form.last, state.focus == last_focus),
    ];

    let visible = (area.height as usize).saturating_sub(2 + INPUT_LINES);
    lines.extend(result_lines(form, visible, state.focus == results_focus));

    let border = focused_border_style(state.focus.role() == Some(role), Style::default());
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(role.label()),
    );
    frame.render_widget(paragraph, area);
}

fn input_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let value_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    };
    let mut spans = vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::styled(value, value_style),
    ];
    if focused {
        spans.push(Span::styled("_", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

/// Result rows windowed so the selected entry stays visible.
fn result_lines(form: &SearchForm, visible: usize, focused: bool) -> Vec<Line<'_>> {
    if form.searching {
        return vec![Line::styled("  Searching...", Style::default().fg(Color::Yellow))];
    }
    if form.results.is_empty() {
        return vec![Line::styled(
            "  Enter a name and press Enter",
            Style::default().fg(Color::DarkGray),
        )];
    }

    let selected = form.selected.unwrap_or(0);
    let visible = visible.max(1);
    let offset = (selected + 1).saturating_sub(visible);

    form.results
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, player)| {
            if i == selected {
                let style = if focused {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                };
                Line::styled(format!("> {}", player.label), style)
            } else {
                Line::styled(format!("  {}", player.label), Style::default().fg(Color::White))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pitchview_baseball::register::PlayerIdentity;

    fn test_state() -> ViewState {
        ViewState::new(
            NaiveDate::from_ymd_opt(2017, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 6, 1).unwrap(),
        )
    }

    fn form_with(n: u64, selected: usize) -> SearchForm {
        SearchForm {
            results: (0..n)
                .map(|i| PlayerIdentity {
                    id: i,
                    label: format!("Player {i} - {i}"),
                })
                .collect(),
            selected: Some(selected),
            ..SearchForm::default()
        }
    }

    #[test]
    fn window_keeps_selection_visible() {
        let form = form_with(10, 7);
        let lines = result_lines(&form, 3, true);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].to_string().contains("Player 7"));
        assert!(lines[2].to_string().starts_with('>'));
    }

    #[test]
    fn searching_replaces_results() {
        let mut form = form_with(2, 0);
        form.searching = true;
        let lines = result_lines(&form, 5, false);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].to_string().contains("Searching"));
    }

    #[test]
    fn render_does_not_panic_empty() {
        let backend = ratatui::backend::TestBackend::new(40, 9);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = test_state();
        terminal
            .draw(|frame| render(frame, frame.area(), &state, Role::Pitcher))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_with_results_and_focus() {
        let backend = ratatui::backend::TestBackend::new(40, 9);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = test_state();
        state.batter = form_with(12, 11);
        state.batter.last = "smith".into();
        state.focus = Focus::BatterResults;
        terminal
            .draw(|frame| render(frame, frame.area(), &state, Role::Batter))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_in_tiny_area() {
        let backend = ratatui::backend::TestBackend::new(10, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = test_state();
        state.pitcher = form_with(3, 2);
        terminal
            .draw(|frame| render(frame, frame.area(), &state, Role::Pitcher))
            .unwrap();
    }
}
