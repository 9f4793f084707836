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
use serde::{Deserialize, Serialize};

use crate::{config::BackendConfig, notation::CompiledPattern};

/// A note as the engine receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNote {
    pub time: f64,
    pub tags: Vec<String>,
}

/// A compiled pattern stripped of its source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRhythm {
    pub notes: Vec<WireNote>,
    pub start: f64,
    pub end: f64,
}

impl From<&CompiledPattern> for WireRhythm {
    fn from(pattern: &CompiledPattern) -> Self {
        WireRhythm {
            notes: pattern
                .notes()
                .iter()
                .map(|note| WireNote {
                    time: note.time,
                    tags: note.tags.iter().cloned().collect(),
                })
                .collect(),
            start: 0.0,
            end: pattern.loop_length(),
        }
    }
}

impl WireRhythm {
    pub fn loop_length(&self) -> f64 {
        self.end - self.start
    }

    /// Returns a running index of the most recent note at or before the given
    /// beat, counting every note of every earlier loop. The index changes
    /// exactly when a note is crossed, which is when a click fires. Returns
    /// None for a rhythm that can't loop.
    pub fn note_index_at(&self, beat: f64) -> Option<i64> {
        let loop_length = self.loop_length();
        if self.notes.is_empty() || !loop_length.is_finite() || loop_length <= 0.0 {
            return None;
        }
        if !beat.is_finite() {
            return None;
        }

        let offset = beat - self.start;
        let loop_count = (offset / loop_length).floor();
        let in_loop = offset - loop_count * loop_length;
        let index = self.notes.partition_point(|note| note.time <= in_loop) as i64 - 1;

        Some(loop_count as i64 * self.notes.len() as i64 + index)
    }
}

/// The backend-owned configuration, in the engine's snake_case form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireConfig {
    pub audio_in_gain: f64,
    pub audio_monitor_on: bool,
    pub beats_to_loop: f64,
    pub bpm: f64,
    pub buffer_compensation: u32,
    pub click_on: bool,
    pub click_toggle: bool,
    pub click_volume: f64,
    pub drum_on: bool,
    pub looping_on: bool,
    pub play_file: bool,
    pub audio_subdivisions: WireRhythm,
    pub visual_monitor_on: bool,
}

impl From<&BackendConfig> for WireConfig {
    fn from(config: &BackendConfig) -> Self {
        WireConfig {
            audio_in_gain: config.audio_in_gain,
            audio_monitor_on: config.audio_monitor_on,
            beats_to_loop: config.beats_to_loop,
            bpm: config.bpm,
            buffer_compensation: config.buffer_compensation,
            click_on: config.click_on,
            click_toggle: config.click_toggle,
            click_volume: config.click_volume,
            drum_on: config.drum_on,
            looping_on: config.looping_on,
            play_file: config.play_file,
            audio_subdivisions: WireRhythm::from(config.audio_subdivisions.compiled()),
            visual_monitor_on: config.visual_monitor_on,
        }
    }
}

impl Default for WireConfig {
    fn default() -> Self {
        WireConfig::from(&BackendConfig::default())
    }
}

impl WireConfig {
    /// The engine's loop recording buffer size in samples: two channels'
    /// worth of `beats_to_loop` at the current tempo.
    pub fn loop_buffer_size(&self, sample_rate: f64) -> usize {
        if self.bpm <= 0.0 {
            return 0;
        }
        let size = self.beats_to_loop * sample_rate * 60.0 * 2.0 / self.bpm;
        if size.is_finite() && size > 0.0 {
            size as usize
        } else {
            0
        }
    }
}
