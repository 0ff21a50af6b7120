// Strike zone plot: matchup pitch locations from the catcher's view.
//
// Braille canvas with the averaged zone outline, home plate, one point set
// per pitch color, a marker on the highlighted pitch and a pitch legend.

use std::collections::BTreeMap;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use pitchview_app::protocol::PlottedPitch;
use pitchview_baseball::pitch::PitchColor;
use pitchview_baseball::zone::{StrikeZone, PLATE_HALF_WIDTH};

use super::{focused_border_style, pitch_color};
use crate::{Focus, ViewState};

/// Horizontal plate coordinate range, in feet.
pub const X_BOUNDS: [f64; 2] = [-3.5, 3.5];
/// Vertical plate coordinate range, in feet.
pub const Y_BOUNDS: [f64; 2] = [-2.5, 6.0];

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let view = &state.matchup;
    let zone = view.zone;
    let groups = color_groups(&view.pitches);
    let legend = legend(&view.pitches);
    let selected = state
        .selected_pitch
        .and_then(|i| view.pitches.get(i))
        .and_then(|p| Some((p.plate_x?, p.plate_z?)));

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border_style(state.focus == Focus::Pitches, Style::default()))
        .title(plot_title(state));
    if let Some(warning) = &view.warning {
        block = block.title_bottom(TextLine::styled(
            format!(" {warning} "),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(X_BOUNDS)
        .y_bounds(Y_BOUNDS)
        .paint(|ctx| {
            draw_zone(ctx, zone);
            for (color, coords) in &groups {
                ctx.draw(&Points {
                    coords: coords.as_slice(),
                    color: pitch_color(*color),
                });
            }
            ctx.layer();
            if let Some((x, z)) = selected {
                let marker = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
                ctx.print(x, z, Span::styled("◆", marker));
            }
            for (i, (name, color)) in legend.iter().enumerate() {
                ctx.print(
                    1.6,
                    Y_BOUNDS[1] - 0.5 * (i as f64 + 1.0),
                    Span::styled(format!("● {name}"), Style::default().fg(pitch_color(*color))),
                );
            }
        });
    frame.render_widget(canvas, area);
}

/// The matchup title, or the selected names before any query has run.
pub fn plot_title(state: &ViewState) -> String {
    if state.has_matchup() {
        return format!(" {} ", state.matchup.title);
    }
    let pitcher = state.pitcher.selected_player().map_or("Pitcher", |p| p.name());
    let batter = state.batter.selected_player().map_or("Batter", |p| p.name());
    format!(" {pitcher} vs. {batter} ")
}

fn draw_zone(ctx: &mut Context<'_>, zone: StrikeZone) {
    let outline = zone.outline();
    for pair in outline.windows(2) {
        let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
        ctx.draw(&Line::new(x1, y1, x2, y2, Color::White));
    }
    ctx.draw(&Line::new(
        -PLATE_HALF_WIDTH,
        0.0,
        PLATE_HALF_WIDTH,
        0.0,
        Color::DarkGray,
    ));
}

/// Plotted coordinates per color. Pitches without a location are skipped.
pub fn color_groups(pitches: &[PlottedPitch]) -> Vec<(PitchColor, Vec<(f64, f64)>)> {
    let mut groups: Vec<(PitchColor, Vec<(f64, f64)>)> = Vec::new();
    for pitch in pitches {
        let (Some(x), Some(z)) = (pitch.plate_x, pitch.plate_z) else {
            continue;
        };
        match groups.iter_mut().find(|(c, _)| *c == pitch.color) {
            Some((_, coords)) => coords.push((x, z)),
            None => groups.push((pitch.color, vec![(x, z)])),
        }
    }
    groups
}

/// Distinct pitch names with their colors, sorted by name.
pub fn legend(pitches: &[PlottedPitch]) -> Vec<(&'static str, PitchColor)> {
    let names: BTreeMap<&'static str, PitchColor> =
        pitches.iter().map(|p| (p.pitch_name, p.color)).collect();
    names.into_iter().collect()
}
