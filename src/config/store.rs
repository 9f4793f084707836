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
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    engine::{Command, WireConfig},
    grid::GridLayout,
};

use super::{keys, Config, ConfigError, ConfigKey, Key, Partition, Value, ValueKind};

/// What a successful change did beyond updating the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Only the local value changed.
    Local,
    /// The backend partition was pushed to the engine.
    Pushed,
    /// The grid layout was rebuilt.
    Geometry,
}

/// Holds the live configuration. Reads always come from local state. Writes
/// to backend-owned keys also queue a push of the whole backend partition to
/// the engine, without waiting for it to be delivered.
pub struct ConfigStore {
    config: Config,
    layout: GridLayout,
    outbox: mpsc::UnboundedSender<Command>,
}

impl ConfigStore {
    /// Creates a store, validating the initial geometry.
    pub fn new(
        config: Config,
        outbox: mpsc::UnboundedSender<Command>,
    ) -> Result<ConfigStore, ConfigError> {
        let layout = config.display.layout()?;
        Ok(ConfigStore {
            config,
            layout,
            outbox,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The layout for the current geometry.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Reads a key with its static type.
    pub fn get<K: ConfigKey>(&self) -> &K::Value {
        K::get(&self.config)
    }

    /// Writes a key with its static type.
    pub fn set<K: ConfigKey>(&mut self, value: K::Value) -> Result<Change, ConfigError> {
        self.set_value(K::KEY, value.into())
    }

    /// Reads any key as a tagged value.
    pub fn value(&self, key: Key) -> Value {
        self.config.value(key)
    }

    /// Writes a tagged value. Non-finite numbers and values that would leave
    /// the grid undrawable are refused, and the previous value stays.
    pub fn set_value(&mut self, key: Key, value: Value) -> Result<Change, ConfigError> {
        if value.kind() != key.kind() {
            return Err(ConfigError::TypeMismatch {
                key: key.name(),
                expected: key.kind(),
                found: value.kind(),
            });
        }
        if let Value::Number(number) = value {
            if !number.is_finite() {
                return Err(ConfigError::NotFinite {
                    key: key.name(),
                    value: number,
                });
            }
        }

        if key.affects_geometry() {
            let mut next = self.config.clone();
            keys::write(&mut next, key, value)?;
            return self.replace_geometry(next);
        }

        keys::write(&mut self.config, key, value)?;
        Ok(self.changed(key))
    }

    /// Applies text typed into a widget. A pattern that fails to compile
    /// still updates the displayed text but nothing else.
    pub fn set_text(&mut self, key: Key, text: &str) -> Result<Change, ConfigError> {
        if key.kind() == ValueKind::Pattern {
            let Value::Pattern(mut pattern) = self.value(key) else {
                return Err(ConfigError::TypeMismatch {
                    key: key.name(),
                    expected: ValueKind::Pattern,
                    found: self.value(key).kind(),
                });
            };
            let result = pattern.edit(text);
            keys::write(&mut self.config, key, Value::Pattern(pattern))?;
            return match result {
                Ok(()) => Ok(self.changed(key)),
                Err(source) => Err(ConfigError::Pattern {
                    key: key.name(),
                    source,
                }),
            };
        }

        let value = Value::parse(key.kind(), text).map_err(|reason| ConfigError::InvalidText {
            key: key.name(),
            text: text.to_string(),
            reason,
        })?;
        self.set_value(key, value)
    }

    /// Updates both canvas dimensions at once, as on a window resize.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Change, ConfigError> {
        let mut next = self.config.clone();
        next.display.canvas_width = width;
        next.display.canvas_height = height;
        self.replace_geometry(next)
    }

    /// Pushes the backend partition to the engine.
    pub fn push(&self) {
        self.send(Command::SetConfig(WireConfig::from(&self.config.backend)));
    }

    /// Queues a command for the engine. Delivery is never confirmed.
    pub fn send(&self, command: Command) {
        let name = command.name();
        if self.outbox.send(command).is_err() {
            warn!(command = name, "Engine outbox closed, dropping command.");
        }
    }

    fn replace_geometry(&mut self, next: Config) -> Result<Change, ConfigError> {
        let layout = next.display.layout()?;
        info!(
            rows = ?next.display.beats_per_row,
            margin = next.display.margin,
            width = next.display.canvas_width,
            height = next.display.canvas_height,
            "Grid geometry changed."
        );
        self.config = next;
        self.layout = layout;
        Ok(Change::Geometry)
    }

    fn changed(&self, key: Key) -> Change {
        match key.partition() {
            Partition::Backend => {
                debug!(key = key.name(), "Pushing backend config.");
                self.push();
                Change::Pushed
            }
            Partition::Display => Change::Local,
        }
    }
}
