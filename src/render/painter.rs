// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use crate::{
    aggregator::{DrawCommand, DrawKind},
    grid::GridLayout,
    notation::{CompiledPattern, Note, BEAT, DOWNBEAT},
};

use super::canvas::{Rgb, Surface};

pub const BACKGROUND: Rgb = Rgb(18, 18, 24);
pub const ALTERNATE_ROW: Rgb = Rgb(24, 24, 32);
pub const MARGIN_SHADE: Rgb = Rgb(40, 34, 28);
pub const BAR_HOME: Rgb = Rgb(90, 200, 250);
pub const BAR_MARGIN: Rgb = Rgb(200, 150, 90);
pub const ROW_LINE: Rgb = Rgb(70, 70, 80);
pub const DOWNBEAT_LINE: Rgb = Rgb(250, 250, 250);
pub const BEAT_LINE: Rgb = Rgb(180, 180, 190);
pub const SUBDIVISION_LINE: Rgb = Rgb(110, 110, 120);

/// Fraction of a row's height a full-scale bar covers.
const BAR_HEIGHT: f64 = 0.9;

/// The background color at a pixel column of a row.
fn background_at(layout: &GridLayout, row: usize, x: f64) -> Rgb {
    let (start, end) = layout.row_extent(row);
    if x < start || x >= end {
        MARGIN_SHADE
    } else if row % 2 == 1 {
        ALTERNATE_ROW
    } else {
        BACKGROUND
    }
}

/// Paints row bands and margin shading over the whole surface.
pub fn paint_background<S: Surface>(surface: &mut S, layout: &GridLayout) {
    surface.clear(BACKGROUND);

    let row_height = layout.row_height();
    let width = f64::from(surface.width());
    for row in 0..layout.rows() {
        let top = layout.row_top(row);
        let (start, end) = layout.row_extent(row);

        surface.fill_rect(0.0, top, start, row_height, MARGIN_SHADE);
        let band = background_at(layout, row, start);
        surface.fill_rect(start, top, end - start, row_height, band);
        surface.fill_rect(end, top, width - end, row_height, MARGIN_SHADE);
    }
}

/// Color for a bar at the given level, from green through yellow to red.
pub fn level_color(value: f64) -> Rgb {
    let value = value.clamp(0.0, 1.0);
    let red = (value * 2.0).min(1.0);
    let green = ((1.0 - value) * 2.0).min(1.0);
    Rgb((red * 255.0) as u8, (green * 255.0) as u8, 40)
}

/// Paints a single waveform bar, centered vertically in its row, after
/// clearing whatever an earlier pass left in that column.
pub fn paint_bar<S: Surface>(
    surface: &mut S,
    layout: &GridLayout,
    command: &DrawCommand,
    color_by_level: bool,
) {
    let row = command.position.row;
    let x = command.column as f64;
    let top = layout.row_top(row);
    let row_height = layout.row_height();

    surface.fill_rect(x, top, 1.0, row_height, background_at(layout, row, x));

    let color = match (command.kind, color_by_level) {
        (DrawKind::MarginDuplicate, _) => BAR_MARGIN,
        (DrawKind::Home, true) => level_color(command.value),
        (DrawKind::Home, false) => BAR_HOME,
    };
    let half = command.value * row_height * BAR_HEIGHT / 2.0;
    let center = top + row_height / 2.0;
    surface.fill_rect(x, center - half, 1.0, half * 2.0, color);
}

fn line_color(note: &Note) -> Rgb {
    if note.has_tag(DOWNBEAT) {
        DOWNBEAT_LINE
    } else if note.has_tag(BEAT) {
        BEAT_LINE
    } else {
        SUBDIVISION_LINE
    }
}

/// Whether a line per note occurrence fits in the pixel columns of the grid.
fn overlay_fits<S: Surface>(
    surface: &S,
    layout: &GridLayout,
    pattern: &CompiledPattern,
) -> bool {
    let lines = pattern.notes().len() as f64 * layout.window_length() / pattern.loop_length();
    lines <= f64::from(surface.width()) * layout.rows() as f64
}

/// Paints row boundaries and a vertical line for every note of the pattern
/// inside the grid window, shifted by `offset` beats. Lines are repeated in
/// the margins of neighboring rows, like bars. Patterns too dense to draw one
/// line per column only get the row boundaries.
pub fn paint_overlay<S: Surface>(
    surface: &mut S,
    layout: &GridLayout,
    pattern: &CompiledPattern,
    offset: f64,
) {
    let width = f64::from(surface.width());
    for row in 1..layout.rows() {
        surface.fill_rect(0.0, layout.row_top(row), width, 1.0, ROW_LINE);
    }
    if !overlay_fits(surface, layout, pattern) {
        return;
    }

    let row_offsets: &[i32] = if layout.margin() > 0.0 {
        &[0, 1, -1]
    } else {
        &[0]
    };
    let row_height = layout.row_height();
    for (beat, note) in pattern.occurrences(-offset, layout.window_length() - offset) {
        let color = line_color(note);
        for row_offset in row_offsets {
            let position = layout.map_beat_with_offset(beat + offset, *row_offset);
            surface.fill_rect(
                position.column() as f64,
                layout.row_top(position.row),
                1.0,
                row_height,
                color,
            );
        }
    }
}
