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
use std::{collections::BTreeMap, path::Path, time::Duration};

use config::{Config, File};
use duration_string::DurationString;
use serde::Deserialize;
use tracing::debug;

use super::{ConfigError, ConfigStore, Key};

const DEFAULT_ENGINE: &str = "simulated";
const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// The engine is polled 44 times a second.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(23);
const DEFAULT_SAMPLE_BUFFER_CAPACITY: usize = 65536;

/// A YAML representation of the startup settings.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Settings {
    /// The engine to connect to.
    engine: Option<String>,

    /// How often a frame is drawn.
    frame_interval: Option<String>,

    /// How often the engine is polled for samples.
    poll_interval: Option<String>,

    /// The most samples held between frames before the oldest are dropped.
    sample_buffer_capacity: Option<usize>,

    /// Initial config values, as text, keyed by config key name.
    #[serde(default)]
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Parse settings from a YAML file.
    pub fn deserialize(path: &Path) -> Result<Settings, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    pub fn engine(&self) -> &str {
        self.engine.as_deref().unwrap_or(DEFAULT_ENGINE)
    }

    pub fn frame_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration(
            "frame_interval",
            &self.frame_interval,
            DEFAULT_FRAME_INTERVAL,
        )
    }

    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration("poll_interval", &self.poll_interval, DEFAULT_POLL_INTERVAL)
    }

    pub fn sample_buffer_capacity(&self) -> usize {
        self.sample_buffer_capacity
            .unwrap_or(DEFAULT_SAMPLE_BUFFER_CAPACITY)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Adds or replaces an initial value.
    pub fn insert_value(&mut self, key: &str, text: &str) {
        self.values.insert(key.to_string(), text.to_string());
    }

    /// Applies the initial values to the store through the same text path
    /// the widgets use. Stops at the first value that is refused.
    pub fn apply(&self, store: &mut ConfigStore) -> Result<(), ConfigError> {
        for (name, text) in &self.values {
            let key = Key::from_name(name)?;
            store.set_text(key, text)?;
            debug!(key = key.name(), value = text, "Applied initial value.");
        }
        Ok(())
    }
}

fn parse_duration(
    field: &'static str,
    value: &Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };

    let duration: Duration = DurationString::from_string(value.clone())
        .map_err(|e| ConfigError::Duration {
            field,
            value: value.clone(),
            reason: e.to_string(),
        })?
        .into();
    if duration.is_zero() {
        return Err(ConfigError::Duration {
            field,
            value: value.clone(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(duration)
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use config::FileFormat;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        config::{keys::Bpm, Value},
        render::Timing,
    };

    fn from_yaml(yaml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = from_yaml("");
        assert_eq!("simulated", settings.engine());
        assert_eq!(Duration::from_millis(16), settings.frame_interval().unwrap());
        assert_eq!(Duration::from_millis(23), settings.poll_interval().unwrap());
        assert_eq!(65536, settings.sample_buffer_capacity());
        assert!(settings.values().is_empty());
    }

    #[test]
    fn test_deserialize() {
        let settings = from_yaml(
            r#"
            engine: mock-engine
            frame_interval: 33ms
            poll_interval: 10ms
            sample_buffer_capacity: 1024
            values:
              bpm: "120"
              beatsPerRow: "3,3"
        "#,
        );

        assert_eq!("mock-engine", settings.engine());
        assert_eq!(Duration::from_millis(33), settings.frame_interval().unwrap());
        assert_eq!(Duration::from_millis(10), settings.poll_interval().unwrap());
        assert_eq!(1024, settings.sample_buffer_capacity());
        assert_eq!(2, settings.values().len());
    }

    #[test]
    fn test_invalid_duration() {
        let settings = from_yaml("frame_interval: soon");
        assert!(matches!(
            settings.frame_interval(),
            Err(ConfigError::Duration {
                field: "frame_interval",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_duration() {
        let settings = from_yaml("frame_interval: 0s\npoll_interval: 0ms");
        assert!(matches!(
            settings.frame_interval(),
            Err(ConfigError::Duration {
                field: "frame_interval",
                ..
            })
        ));
        assert!(matches!(
            settings.poll_interval(),
            Err(ConfigError::Duration {
                field: "poll_interval",
                ..
            })
        ));
        assert!(Timing::from_settings(&settings).is_err());
    }

    #[test]
    fn test_deserialize_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "engine: mock\nvalues:\n  margin: \"0.5\"").unwrap();

        let settings = Settings::deserialize(file.path()).unwrap();
        assert_eq!("mock", settings.engine());
        assert_eq!(Some(&"0.5".to_string()), settings.values().get("margin"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Settings::deserialize(&dir.path().join("missing.yaml")),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_apply() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut store = ConfigStore::new(crate::config::Config::default(), tx).unwrap();

        let mut settings = Settings::default();
        settings.insert_value("bpm", "120");
        settings.insert_value("beats_per_row", "3,3");
        settings.apply(&mut store).unwrap();

        assert_eq!(&120.0, store.get::<Bpm>());
        assert_eq!(Value::Counts(vec![3, 3]), store.value(Key::BeatsPerRow));

        settings.insert_value("tempo", "90");
        assert!(matches!(
            settings.apply(&mut store),
            Err(ConfigError::UnknownKey(_))
        ));
    }
}
