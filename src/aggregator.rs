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

//! Peak-hold downsampling of beat-indexed samples into per-column draw
//! commands.

use serde::{Deserialize, Serialize};

use crate::grid::{GridLayout, GridPosition};

/// One amplitude reading at a musical position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatSample {
    pub beat: f64,
    pub amplitude: f64,
}

impl BeatSample {
    pub fn new(beat: f64, amplitude: f64) -> BeatSample {
        BeatSample { beat, amplitude }
    }
}

/// Whether a command draws a column in its home row or repeats it in a
/// neighboring row's margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Home,
    MarginDuplicate,
}

/// A single waveform bar to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub position: GridPosition,
    pub column: i64,
    /// Bar level in `[0, 1]`.
    pub value: f64,
    pub kind: DrawKind,
}

/// Aggregation state carried between batches. Only reset when the grid
/// geometry changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    /// The row and pixel column currently accumulating, if any.
    pub last_column: Option<(usize, i64)>,
    /// The beat that opened the current column.
    pub column_beat: f64,
    /// Largest magnitude seen in the current column.
    pub peak: f64,
}

pub struct SampleAggregator {
    layout: GridLayout,
    visual_gain: f64,
    state: RenderState,
}

impl SampleAggregator {
    pub fn new(layout: GridLayout, visual_gain: f64) -> SampleAggregator {
        SampleAggregator {
            layout,
            visual_gain,
            state: RenderState::default(),
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Replaces the geometry. Any partially accumulated column is discarded,
    /// since it no longer maps anywhere meaningful.
    pub fn set_layout(&mut self, layout: GridLayout) {
        self.layout = layout;
        self.state = RenderState::default();
    }

    pub fn set_visual_gain(&mut self, visual_gain: f64) {
        self.visual_gain = visual_gain;
    }

    /// Ingests a batch of samples. Each time the mapped column changes, the
    /// column being left is flushed as one home command, plus a duplicate in
    /// the row above and below when the grid has a margin. The newest column
    /// stays open until a later sample leaves it.
    pub fn ingest(&mut self, samples: &[BeatSample]) -> Vec<DrawCommand> {
        let mut commands = Vec::new();

        for sample in samples {
            if !sample.beat.is_finite() || !sample.amplitude.is_finite() {
                continue;
            }

            let position = self.layout.map_beat(sample.beat);
            let column = (position.row, position.column());

            if self.state.last_column != Some(column) {
                if self.state.last_column.is_some() {
                    self.flush(&mut commands);
                }
                self.state.last_column = Some(column);
                self.state.column_beat = sample.beat;
                self.state.peak = 0.0;
            }

            self.state.peak = self.state.peak.max(sample.amplitude.abs());
        }

        commands
    }

    fn flush(&self, commands: &mut Vec<DrawCommand>) {
        let value = (self.state.peak * self.visual_gain).clamp(0.0, 1.0);
        let beat = self.state.column_beat;

        let home = self.layout.map_beat(beat);
        commands.push(DrawCommand {
            position: home,
            column: home.column(),
            value,
            kind: DrawKind::Home,
        });

        if self.layout.margin() > 0.0 {
            for row_offset in [1, -1] {
                let position = self.layout.map_beat_with_offset(beat, row_offset);
                commands.push(DrawCommand {
                    position,
                    column: position.column(),
                    value,
                    kind: DrawKind::MarginDuplicate,
                });
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    fn aggregator(margin: f64) -> SampleAggregator {
        // 100 pixels per beat when the margin is zero.
        SampleAggregator::new(GridLayout::new(&[2, 2], margin, 200, 100).unwrap(), 1.0)
    }

    fn homes(commands: &[DrawCommand]) -> Vec<DrawCommand> {
        commands
            .iter()
            .filter(|command| command.kind == DrawKind::Home)
            .copied()
            .collect()
    }

    #[test]
    fn test_peak_hold_within_column() {
        let mut aggregator = aggregator(0.0);
        let commands = aggregator.ingest(&[
            BeatSample::new(0.001, 0.1),
            BeatSample::new(0.002, -0.6),
            BeatSample::new(0.003, 0.2),
            BeatSample::new(0.011, 0.05),
        ]);

        assert_eq!(1, commands.len());
        assert_eq!(0, commands[0].column);
        assert_eq!(0, commands[0].position.row);
        assert_eq!(0.6, commands[0].value);
        assert_eq!(Some((0, 1)), aggregator.state().last_column);
        assert_eq!(0.05, aggregator.state().peak);
    }

    #[test]
    fn test_open_column_spans_batches() {
        let mut aggregator = aggregator(0.0);
        assert!(aggregator.ingest(&[BeatSample::new(0.001, 0.3)]).is_empty());
        assert!(aggregator.ingest(&[BeatSample::new(0.005, -0.7)]).is_empty());

        let commands = aggregator.ingest(&[BeatSample::new(0.02, 0.0)]);
        assert_eq!(1, commands.len());
        assert_eq!(0.7, commands[0].value);
    }

    #[test]
    fn test_one_command_per_column() {
        let mut aggregator = aggregator(0.0);
        // Ten samples per column across 100 columns.
        let samples: Vec<BeatSample> = (0..1000)
            .map(|i| BeatSample::new(i as f64 * 0.001, ((i * 37) % 100) as f64 / 100.0))
            .collect();
        let commands = aggregator.ingest(&samples);

        let mut seen = HashSet::new();
        for command in &commands {
            assert!(seen.insert((command.position.row, command.column)));
        }
        assert_eq!(99, commands.len());

        // Every flushed value covers every sample that mapped to its column.
        for command in &commands {
            let layout = aggregator.layout();
            let peak = samples
                .iter()
                .filter(|sample| {
                    let position = layout.map_beat(sample.beat);
                    position.row == command.position.row && position.column() == command.column
                })
                .map(|sample| sample.amplitude.abs())
                .fold(0.0, f64::max);
            assert!(command.value >= peak);
        }
    }

    #[test]
    fn test_visual_gain_clamps_to_one() {
        let mut aggregator = aggregator(0.0);
        aggregator.set_visual_gain(10.0);
        let commands =
            aggregator.ingest(&[BeatSample::new(0.001, 0.05), BeatSample::new(0.5, 0.5)]);
        assert_eq!(0.5, commands[0].value);

        let commands = aggregator.ingest(&[BeatSample::new(1.0, 0.0)]);
        assert_eq!(1.0, commands[0].value);
    }

    #[test]
    fn test_margin_duplicates() {
        let mut aggregator = aggregator(0.5);
        let commands =
            aggregator.ingest(&[BeatSample::new(2.05, 0.4), BeatSample::new(2.5, 0.1)]);

        assert_eq!(3, commands.len());
        assert_eq!(1, homes(&commands).len());
        assert_eq!(1, commands[0].position.row);

        let duplicates: Vec<&DrawCommand> = commands
            .iter()
            .filter(|command| command.kind == DrawKind::MarginDuplicate)
            .collect();
        assert_eq!(2, duplicates.len());
        for duplicate in duplicates {
            assert_eq!(0, duplicate.position.row);
            assert_eq!(0.4, duplicate.value);
        }
    }

    #[test]
    fn test_no_duplicates_without_margin() {
        let mut aggregator = aggregator(0.0);
        let commands =
            aggregator.ingest(&[BeatSample::new(2.05, 0.4), BeatSample::new(2.5, 0.1)]);
        assert_eq!(1, commands.len());
        assert_eq!(DrawKind::Home, commands[0].kind);
    }

    #[test]
    fn test_wraparound_revisits_columns() {
        let mut aggregator = aggregator(0.0);
        let commands = aggregator.ingest(&[
            BeatSample::new(0.001, 0.2),
            BeatSample::new(4.001, 0.3),
            BeatSample::new(4.5, 0.0),
        ]);
        assert_eq!(1, commands.len());
        assert_eq!(0.3, commands[0].value);

        let commands =
            aggregator.ingest(&[BeatSample::new(3.999, 0.9), BeatSample::new(8.001, 0.0)]);
        assert_eq!(2, commands.len());
        assert_eq!((1, 199), (commands[1].position.row, commands[1].column));
        assert_eq!(0.9, commands[1].value);
    }

    #[test]
    fn test_set_layout_resets_state() {
        let mut aggregator = aggregator(0.0);
        aggregator.ingest(&[BeatSample::new(0.001, 0.8)]);
        assert!(aggregator.state().last_column.is_some());

        aggregator.set_layout(GridLayout::new(&[4], 0.0, 400, 100).unwrap());
        assert_eq!(&RenderState::default(), aggregator.state());
        assert!(aggregator.ingest(&[BeatSample::new(3.0, 0.1)]).is_empty());
    }

    #[test]
    fn test_skips_non_finite_samples() {
        let mut aggregator = aggregator(0.0);
        let commands = aggregator.ingest(&[
            BeatSample::new(0.001, 0.2),
            BeatSample::new(f64::NAN, 1.0),
            BeatSample::new(0.002, f64::INFINITY),
            BeatSample::new(0.5, 0.0),
        ]);
        assert_eq!(1, commands.len());
        assert_eq!(0.2, commands[0].value);
    }
}
