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

//! The external audio engine, as seen from the visualizer: a source of
//! beat-indexed samples and a sink for configuration.

use std::{fmt, sync::Arc};

use serde::Serialize;
use tokio::sync::broadcast;

pub mod mock;
mod simulated;
mod wire;

pub use crate::aggregator::BeatSample;
pub use wire::{WireConfig, WireNote, WireRhythm};

/// Capacity of each engine's log broadcast channel.
const LOG_CHANNEL_SIZE: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown engine '{0}'")]
    UnknownEngine(String),

    #[error("unable to use audio file {path}: {reason}")]
    AudioFile { path: String, reason: String },

    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// A diagnostic message published on the engine's `log` channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub message: Vec<String>,
}

impl LogEvent {
    pub fn new(message: impl Into<String>) -> LogEvent {
        LogEvent {
            message: vec![message.into()],
        }
    }
}

/// An audio engine the visualizer can poll and configure. Calls are expected
/// to return promptly; none of them wait on audio I/O.
pub trait Engine: fmt::Display + Send + Sync {
    /// Returns every sample produced since the previous call.
    fn get_samples(&self) -> Result<Vec<BeatSample>, EngineError>;

    /// Replaces the engine's configuration wholesale.
    fn set_config(&self, config: &WireConfig) -> Result<(), EngineError>;

    /// Resets the engine's beat counter to zero.
    fn reset_beat(&self) -> Result<(), EngineError>;

    /// Points the engine at a new audio file.
    fn set_mp3_buffer(&self, filename: &str) -> Result<(), EngineError>;

    /// Subscribes to the engine's `log` channel.
    fn subscribe_logs(&self) -> broadcast::Receiver<LogEvent>;

    #[cfg(test)]
    fn to_mock(&self) -> Result<Arc<mock::Engine>, EngineError>;
}

/// A call queued for delivery to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetConfig(WireConfig),
    ResetBeat,
    SetMp3Buffer(String),
}

impl Command {
    /// Delivers the command to the engine.
    pub fn dispatch(&self, engine: &dyn Engine) -> Result<(), EngineError> {
        match self {
            Command::SetConfig(config) => engine.set_config(config),
            Command::ResetBeat => engine.reset_beat(),
            Command::SetMp3Buffer(filename) => engine.set_mp3_buffer(filename),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SetConfig(_) => "set_config",
            Command::ResetBeat => "reset_beat",
            Command::SetMp3Buffer(_) => "set_mp3_buffer",
        }
    }
}

/// Gets the engine with the given name. Names starting with "mock" return a
/// mock engine.
pub fn get_engine(name: &str) -> Result<Arc<dyn Engine>, EngineError> {
    if name.starts_with("mock") {
        return Ok(Arc::new(mock::Engine::get(name)));
    }

    match name {
        "simulated" => Ok(Arc::new(simulated::Engine::new())),
        _ => Err(EngineError::UnknownEngine(name.to_string())),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_engine() {
        let engine = get_engine("mock-engine").unwrap();
        assert_eq!("mock-engine (Mock)", engine.to_string());
        assert!(engine.to_mock().is_ok());

        let engine = get_engine("simulated").unwrap();
        assert_eq!("Simulated", engine.to_string());
        assert!(engine.to_mock().is_err());

        assert!(matches!(
            get_engine("alsa"),
            Err(EngineError::UnknownEngine(name)) if name == "alsa"
        ));
    }

    #[test]
    fn test_dispatch() {
        let engine = mock::Engine::get("mock");
        Command::ResetBeat.dispatch(&engine).unwrap();
        Command::SetMp3Buffer("song.mp3".to_string())
            .dispatch(&engine)
            .unwrap();
        Command::SetConfig(WireConfig::default())
            .dispatch(&engine)
            .unwrap();

        assert_eq!(1, engine.resets());
        assert_eq!(vec!["song.mp3".to_string()], engine.files());
        assert_eq!(Some(WireConfig::default()), engine.last_config());
    }

    #[test]
    fn test_dispatch_failure() {
        let engine = mock::Engine::get("mock");
        engine.set_failing(true);
        assert!(matches!(
            Command::ResetBeat.dispatch(&engine),
            Err(EngineError::Unavailable(_))
        ));
        assert_eq!(0, engine.resets());
    }
}
