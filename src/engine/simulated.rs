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
use std::{fmt, path::Path, time::Duration};

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::{sync::broadcast, time::Instant};
use tracing::{debug, info};

use super::{BeatSample, EngineError, LogEvent, WireConfig, LOG_CHANNEL_SIZE};

/// The audio rate the simulated signal is derived from.
const SAMPLE_RATE: f64 = 44100.0;

/// Only every 64th audio frame is reported to the visualizer.
const DECIMATION: f64 = 64.0;

/// Never generate more than this much signal in a single poll, so a stalled
/// caller doesn't receive a flood of stale samples.
const MAX_POLL_SPAN: Duration = Duration::from_secs(1);

/// How long a click rings, in reported samples.
const CLICK_SAMPLES: u32 = 24;

/// Amplitude of the background noise at an input gain of 1.
const NOISE_LEVEL: f64 = 0.02;

const SEED: u64 = 0x6265_6174;

struct State {
    config: WireConfig,
    beat: f64,
    last_poll: Instant,
    last_note: Option<i64>,
    click_remaining: u32,
    loop_buffer_size: usize,
    audio_file: Option<String>,
    rng: StdRng,
}

/// A stand-in for the real audio engine. Advances its beat counter in real
/// time and synthesizes a noise floor with a decaying burst on every click
/// of the audio subdivision pattern.
pub struct Engine {
    state: Mutex<State>,
    logs: broadcast::Sender<LogEvent>,
}

impl Engine {
    pub fn new() -> Engine {
        let (logs, _) = broadcast::channel(LOG_CHANNEL_SIZE);
        let config = WireConfig::default();
        Engine {
            state: Mutex::new(State {
                loop_buffer_size: config.loop_buffer_size(SAMPLE_RATE),
                config,
                beat: 0.0,
                last_poll: Instant::now(),
                last_note: None,
                click_remaining: 0,
                audio_file: None,
                rng: StdRng::seed_from_u64(SEED),
            }),
            logs,
        }
    }

    fn log(&self, messages: Vec<String>) {
        // Nobody listening is fine.
        let _ = self.logs.send(LogEvent { message: messages });
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl State {
    fn next_sample(&mut self, beats_per_sample: f64) -> BeatSample {
        self.beat += beats_per_sample;

        let note = self.config.audio_subdivisions.note_index_at(self.beat);
        if note != self.last_note {
            self.last_note = note;
            if self.config.click_on && note.is_some() {
                self.click_remaining = CLICK_SAMPLES;
            }
        }

        let noise = self.rng.gen_range(-1.0..=1.0) * NOISE_LEVEL * self.config.audio_in_gain;
        let click = if self.click_remaining > 0 {
            self.click_remaining -= 1;
            let envelope = f64::from(self.click_remaining) / f64::from(CLICK_SAMPLES);
            let polarity = if self.click_remaining % 2 == 0 { 1.0 } else { -1.0 };
            self.config.click_volume * envelope * polarity
        } else {
            0.0
        };

        BeatSample::new(self.beat, (noise + click).clamp(-1.0, 1.0))
    }
}

impl super::Engine for Engine {
    fn get_samples(&self) -> Result<Vec<BeatSample>, EngineError> {
        let mut state = self.state.lock();

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_poll).min(MAX_POLL_SPAN);
        let sample_period = DECIMATION / SAMPLE_RATE;
        let count = (elapsed.as_secs_f64() / sample_period).floor() as u32;
        if count == 0 {
            return Ok(Vec::new());
        }

        // Carry the fraction of a sample period over to the next poll.
        if now.duration_since(state.last_poll) > MAX_POLL_SPAN {
            state.last_poll = now;
        } else {
            state.last_poll += Duration::from_secs_f64(f64::from(count) * sample_period);
        }

        let beats_per_sample = state.config.bpm / 60.0 * sample_period;
        let samples: Vec<BeatSample> = (0..count)
            .map(|_| state.next_sample(beats_per_sample))
            .collect();

        if !state.config.visual_monitor_on {
            return Ok(Vec::new());
        }
        Ok(samples)
    }

    fn set_config(&self, config: &WireConfig) -> Result<(), EngineError> {
        let mut messages = vec![format!(
            "set_config: bpm {}, beats_to_loop {}, click {}",
            config.bpm,
            config.beats_to_loop,
            if config.click_on { "on" } else { "off" }
        )];

        {
            let mut state = self.state.lock();
            let resize_loop = state.config.bpm != config.bpm
                || state.config.beats_to_loop != config.beats_to_loop
                || state.config.buffer_compensation != config.buffer_compensation;
            state.config = config.clone();

            if resize_loop {
                state.loop_buffer_size = config.loop_buffer_size(SAMPLE_RATE);
                info!(
                    loop_buffer_size = state.loop_buffer_size,
                    "Updated loop buffer."
                );
                messages.push(format!("loop buffer size: {}", state.loop_buffer_size));
            }
            if let (true, Some(file)) = (config.play_file, &state.audio_file) {
                messages.push(format!("playing file: {}", file));
            }
        }

        self.log(messages);
        Ok(())
    }

    fn reset_beat(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        debug!(beat = state.beat, "Resetting beat.");
        state.beat = 0.0;
        state.last_note = None;
        state.click_remaining = 0;
        Ok(())
    }

    fn set_mp3_buffer(&self, filename: &str) -> Result<(), EngineError> {
        if !Path::new(filename).is_file() {
            return Err(EngineError::AudioFile {
                path: filename.to_string(),
                reason: "not a readable file".to_string(),
            });
        }

        self.state.lock().audio_file = Some(filename.to_string());
        info!(file = filename, "Audio file selected.");
        self.log(vec![format!("audio file: {}", filename)]);
        Ok(())
    }

    fn subscribe_logs(&self) -> broadcast::Receiver<LogEvent> {
        self.logs.subscribe()
    }

    #[cfg(test)]
    fn to_mock(&self) -> Result<std::sync::Arc<super::mock::Engine>, EngineError> {
        Err(EngineError::Unavailable(
            "the simulated engine is not a mock".to_string(),
        ))
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Simulated")
    }
}
