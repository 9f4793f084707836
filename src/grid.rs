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

//! Geometry of the beat grid: which row a beat position lands in and where
//! along that row it is drawn.

use tracing::warn;

/// The largest canvas width or height, in pixels.
pub const MAX_CANVAS_DIMENSION: u32 = 16384;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("the grid needs at least one row")]
    NoRows,

    #[error("row {0} has no beats")]
    EmptyRow(usize),

    #[error("margin {0} must be a finite, non-negative number of beats")]
    InvalidMargin(f64),

    #[error("canvas size {width}x{height} has no area")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("canvas size {width}x{height} is larger than {max}x{max}", max = MAX_CANVAS_DIMENSION)]
    CanvasTooLarge { width: u32, height: u32 },
}

/// Where a beat is drawn on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPosition {
    /// Horizontal pixel offset from the left edge of the canvas. May fall
    /// outside the canvas for margin duplicates.
    pub x: f64,
    /// Row index, counted from the top.
    pub row: usize,
}

impl GridPosition {
    /// The whole pixel column containing this position.
    pub fn column(&self) -> i64 {
        self.x.floor() as i64
    }
}

/// An immutable grid geometry. Rebuilt whenever row counts, margin or canvas
/// size change.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    row_beat_counts: Vec<u32>,
    margin: f64,
    width: u32,
    height: u32,

    /// cumulative[r] is the beat at which row r starts. Has one more entry
    /// than there are rows; the last entry is the window length.
    cumulative: Vec<f64>,
    pixels_per_beat: f64,
}

impl GridLayout {
    /// Creates a new layout, rejecting geometry that can't be drawn.
    pub fn new(
        row_beat_counts: &[u32],
        margin: f64,
        width: u32,
        height: u32,
    ) -> Result<GridLayout, LayoutError> {
        if row_beat_counts.is_empty() {
            return Err(LayoutError::NoRows);
        }
        if let Some(row) = row_beat_counts.iter().position(|count| *count == 0) {
            return Err(LayoutError::EmptyRow(row));
        }
        if !margin.is_finite() || margin < 0.0 {
            return Err(LayoutError::InvalidMargin(margin));
        }
        if width == 0 || height == 0 {
            return Err(LayoutError::EmptyCanvas { width, height });
        }
        if width > MAX_CANVAS_DIMENSION || height > MAX_CANVAS_DIMENSION {
            return Err(LayoutError::CanvasTooLarge { width, height });
        }

        let mut cumulative = Vec::with_capacity(row_beat_counts.len() + 1);
        let mut total = 0.0;
        cumulative.push(total);
        for count in row_beat_counts {
            total += f64::from(*count);
            cumulative.push(total);
        }

        let longest = row_beat_counts.iter().copied().max().unwrap_or(1);
        let shortest = row_beat_counts.iter().copied().min().unwrap_or(1);
        if margin >= f64::from(shortest) {
            warn!(
                margin,
                shortest_row = shortest,
                "Margin is as long as a row; duplicates will overlap"
            );
        }

        Ok(GridLayout {
            row_beat_counts: row_beat_counts.to_vec(),
            margin,
            width,
            height,
            cumulative,
            pixels_per_beat: f64::from(width) / (f64::from(longest) + 2.0 * margin),
        })
    }

    pub fn row_beat_counts(&self) -> &[u32] {
        &self.row_beat_counts
    }

    pub fn rows(&self) -> usize {
        self.row_beat_counts.len()
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels_per_beat(&self) -> f64 {
        self.pixels_per_beat
    }

    /// The number of beats shown before the grid wraps back to the top row.
    pub fn window_length(&self) -> f64 {
        self.cumulative[self.rows()]
    }

    /// The beat at which the given row starts within the window.
    pub fn row_start(&self, row: usize) -> f64 {
        self.cumulative[row % self.rows()]
    }

    /// Height of a single row in pixels.
    pub fn row_height(&self) -> f64 {
        f64::from(self.height) / self.rows() as f64
    }

    /// Pixel offset of the top of the given row.
    pub fn row_top(&self, row: usize) -> f64 {
        row as f64 * self.row_height()
    }

    /// The horizontal pixel extent of a row's own beats, excluding margins.
    pub fn row_extent(&self, row: usize) -> (f64, f64) {
        let start = self.margin * self.pixels_per_beat;
        let beats = f64::from(self.row_beat_counts[row % self.rows()]);
        (start, start + beats * self.pixels_per_beat)
    }

    /// Maps a beat to its home row.
    pub fn map_beat(&self, beat: f64) -> GridPosition {
        self.map_beat_with_offset(beat, 0)
    }

    /// Maps a beat onto the row `row_offset` rows away from its home row. The
    /// beat keeps its place in musical time, so on a neighboring row it lands
    /// in that row's margin: trailing past the end of the row above, or
    /// leading before the start of the row below. Offsets wrap around the
    /// grid, so the last row's neighbor below is the first row, one window
    /// later. Non-finite beats map as beat zero.
    pub fn map_beat_with_offset(&self, beat: f64, row_offset: i32) -> GridPosition {
        let window = self.window_length();
        let mut b = if beat.is_finite() {
            beat.rem_euclid(window)
        } else {
            0.0
        };
        // rem_euclid can round up to the modulus for tiny negative inputs.
        if b >= window {
            b = 0.0;
        }

        let rows = self.rows() as i64;
        let home = self.cumulative[..self.rows()]
            .partition_point(|start| *start <= b)
            .saturating_sub(1) as i64;
        let target = home + i64::from(row_offset);
        let row = target.rem_euclid(rows) as usize;
        let wraps = target.div_euclid(rows) as f64;

        let start = self.cumulative[row] + wraps * window;
        GridPosition {
            x: (b - start + self.margin) * self.pixels_per_beat,
            row,
        }
    }
}
