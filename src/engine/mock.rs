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
use std::{collections::VecDeque, fmt, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::info;

use super::{BeatSample, EngineError, LogEvent, WireConfig, LOG_CHANNEL_SIZE};

#[derive(Default)]
struct Recorded {
    configs: Vec<WireConfig>,
    pending: VecDeque<BeatSample>,
    polls: usize,
    resets: usize,
    files: Vec<String>,
    failing: bool,
}

/// A mock engine. Produces only the samples it is handed and records every
/// call it receives.
#[derive(Clone)]
pub struct Engine {
    name: String,
    recorded: Arc<Mutex<Recorded>>,
    logs: broadcast::Sender<LogEvent>,
}

impl Engine {
    /// Gets the given mock engine.
    pub fn get(name: &str) -> Engine {
        let (logs, _) = broadcast::channel(LOG_CHANNEL_SIZE);
        Engine {
            name: name.to_string(),
            recorded: Arc::new(Mutex::new(Recorded::default())),
            logs,
        }
    }

    fn check_failing(&self, call: &str) -> Result<(), EngineError> {
        if self.recorded.lock().failing {
            return Err(EngineError::Unavailable(format!(
                "{} rejected {}",
                self.name, call
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    /// Queues samples to be returned by the next poll.
    pub fn queue_samples(&self, samples: &[BeatSample]) {
        self.recorded.lock().pending.extend(samples.iter().copied());
    }

    #[cfg(test)]
    /// Makes every subsequent call fail.
    pub fn set_failing(&self, failing: bool) {
        self.recorded.lock().failing = failing;
    }

    #[cfg(test)]
    /// Publishes a message on the log channel.
    pub fn emit_log(&self, message: &str) {
        let _ = self.logs.send(LogEvent::new(message));
    }

    #[cfg(test)]
    pub fn configs(&self) -> Vec<WireConfig> {
        self.recorded.lock().configs.clone()
    }

    #[cfg(test)]
    pub fn last_config(&self) -> Option<WireConfig> {
        self.recorded.lock().configs.last().cloned()
    }

    #[cfg(test)]
    pub fn polls(&self) -> usize {
        self.recorded.lock().polls
    }

    #[cfg(test)]
    pub fn resets(&self) -> usize {
        self.recorded.lock().resets
    }

    #[cfg(test)]
    pub fn files(&self) -> Vec<String> {
        self.recorded.lock().files.clone()
    }
}

impl super::Engine for Engine {
    fn get_samples(&self) -> Result<Vec<BeatSample>, EngineError> {
        self.check_failing("get_samples")?;
        let mut recorded = self.recorded.lock();
        recorded.polls += 1;
        Ok(recorded.pending.drain(..).collect())
    }

    fn set_config(&self, config: &WireConfig) -> Result<(), EngineError> {
        self.check_failing("set_config")?;
        info!(engine = self.name, bpm = config.bpm, "Config received (mock).");
        self.recorded.lock().configs.push(config.clone());
        Ok(())
    }

    fn reset_beat(&self) -> Result<(), EngineError> {
        self.check_failing("reset_beat")?;
        self.recorded.lock().resets += 1;
        Ok(())
    }

    fn set_mp3_buffer(&self, filename: &str) -> Result<(), EngineError> {
        self.check_failing("set_mp3_buffer")?;
        self.recorded.lock().files.push(filename.to_string());
        Ok(())
    }

    fn subscribe_logs(&self) -> broadcast::Receiver<LogEvent> {
        self.logs.subscribe()
    }

    #[cfg(test)]
    fn to_mock(&self) -> Result<Arc<Engine>, EngineError> {
        Ok(Arc::new(self.clone()))
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
