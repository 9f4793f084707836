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

//! Runtime configuration: the engine's parameters and the visualizer's own,
//! behind one key namespace.

use serde::Serialize;

use crate::grid::{GridLayout, LayoutError};

mod error;
pub mod keys;
mod settings;
mod store;
mod value;

pub use error::ConfigError;
pub use keys::{ConfigKey, Key};
pub use settings::Settings;
pub use store::{Change, ConfigStore};
pub use value::{PatternInput, Value, ValueKind};

/// Which side of the system owns a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Partition {
    /// Meaningful to the audio engine; every change is pushed to it.
    Backend,
    /// Only affects drawing.
    Display,
}

/// Parameters owned by the audio engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub audio_in_gain: f64,
    pub audio_monitor_on: bool,
    pub beats_to_loop: f64,
    pub bpm: f64,
    /// Latency compensation, in samples.
    pub buffer_compensation: u32,
    pub click_on: bool,
    pub click_toggle: bool,
    pub click_volume: f64,
    pub drum_on: bool,
    pub looping_on: bool,
    pub play_file: bool,
    /// Rhythm of the audible click.
    pub audio_subdivisions: PatternInput,
    pub visual_monitor_on: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            audio_in_gain: 1.0,
            audio_monitor_on: false,
            beats_to_loop: 4.0,
            bpm: 91.0,
            buffer_compensation: 4330,
            click_on: true,
            click_toggle: false,
            click_volume: 0.3,
            drum_on: true,
            looping_on: false,
            play_file: true,
            audio_subdivisions: PatternInput::default(),
            visual_monitor_on: true,
        }
    }
}

/// Parameters that only affect the visualizer.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Color bars by level rather than by row.
    pub bar_color_mode: bool,
    pub beats_per_row: Vec<u32>,
    pub canvas_height: u32,
    pub canvas_width: u32,
    /// Beats of overlap drawn into neighboring rows.
    pub margin: f64,
    /// Rhythm of the overlay lines.
    pub visual_subdivisions: PatternInput,
    /// Shifts the overlay lines along the beat axis.
    pub subdivision_offset: f64,
    pub visual_gain: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            bar_color_mode: false,
            beats_per_row: vec![2, 2],
            canvas_height: 1000,
            canvas_width: 2000,
            margin: 0.11,
            visual_subdivisions: PatternInput::default(),
            subdivision_offset: 0.0,
            visual_gain: 10.0,
        }
    }
}

impl DisplayConfig {
    /// Builds the grid these parameters describe.
    pub fn layout(&self) -> Result<GridLayout, LayoutError> {
        GridLayout::new(
            &self.beats_per_row,
            self.margin,
            self.canvas_width,
            self.canvas_height,
        )
    }
}

/// The full configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub backend: BackendConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Reads any key as a tagged value.
    pub fn value(&self, key: Key) -> Value {
        keys::read(self, key)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = Config::default().display.layout().unwrap();
        assert_eq!(4.0, layout.window_length());
        assert_eq!(2, layout.rows());
        assert!((layout.pixels_per_beat() - 2000.0 / 2.22).abs() < 1e-9);
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        for key in Key::ALL {
            assert_eq!(key.kind(), config.value(*key).kind());
        }
        assert_eq!(Value::Counts(vec![2, 2]), config.value(Key::BeatsPerRow));
        assert_eq!(Value::Count(4330), config.value(Key::BufferCompensation));
        assert_eq!("2:1", config.value(Key::AudioSubdivisions).to_string());
    }
}
