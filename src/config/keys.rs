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
use super::{Config, ConfigError, Partition, PatternInput, Value, ValueKind};

/// A config key with a statically known value type.
pub trait ConfigKey {
    type Value: Clone + Into<Value>;

    const KEY: Key;

    fn get(config: &Config) -> &Self::Value;
}

macro_rules! config_keys {
    (@partition backend) => { Partition::Backend };
    (@partition display) => { Partition::Display };
    ($($marker:ident => $partition:ident.$field:ident: $kind:ident($ty:ty),)*) => {
        /// Every config key, across both partitions.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Key {
            $($marker,)*
        }

        impl Key {
            pub const ALL: &'static [Key] = &[$(Key::$marker,)*];

            /// The snake_case name, as sent to the engine.
            pub fn name(self) -> &'static str {
                match self {
                    $(Key::$marker => stringify!($field),)*
                }
            }

            pub fn kind(self) -> ValueKind {
                match self {
                    $(Key::$marker => ValueKind::$kind,)*
                }
            }
        }

        $(
            pub struct $marker;

            impl ConfigKey for $marker {
                type Value = $ty;

                const KEY: Key = Key::$marker;

                fn get(config: &Config) -> &$ty {
                    &config.$partition.$field
                }
            }
        )*

        /// Reads a key as a tagged value.
        pub(super) fn read(config: &Config, key: Key) -> Value {
            match key {
                $(Key::$marker => Value::$kind(config.$partition.$field.clone()),)*
            }
        }

        /// Writes a tagged value, checking that its kind matches the key.
        pub(super) fn write(config: &mut Config, key: Key, value: Value) -> Result<(), ConfigError> {
            match (key, value) {
                $((Key::$marker, Value::$kind(value)) => config.$partition.$field = value,)*
                (key, value) => {
                    return Err(ConfigError::TypeMismatch {
                        key: key.name(),
                        expected: key.kind(),
                        found: value.kind(),
                    })
                }
            }
            Ok(())
        }

        fn partition_of(key: Key) -> Partition {
            match key {
                $(Key::$marker => config_keys!(@partition $partition),)*
            }
        }
    };
}

config_keys! {
    AudioInGain => backend.audio_in_gain: Number(f64),
    AudioMonitorOn => backend.audio_monitor_on: Toggle(bool),
    BeatsToLoop => backend.beats_to_loop: Number(f64),
    Bpm => backend.bpm: Number(f64),
    BufferCompensation => backend.buffer_compensation: Count(u32),
    ClickOn => backend.click_on: Toggle(bool),
    ClickToggle => backend.click_toggle: Toggle(bool),
    ClickVolume => backend.click_volume: Number(f64),
    DrumOn => backend.drum_on: Toggle(bool),
    LoopingOn => backend.looping_on: Toggle(bool),
    PlayFile => backend.play_file: Toggle(bool),
    AudioSubdivisions => backend.audio_subdivisions: Pattern(PatternInput),
    VisualMonitorOn => backend.visual_monitor_on: Toggle(bool),
    BarColorMode => display.bar_color_mode: Toggle(bool),
    BeatsPerRow => display.beats_per_row: Counts(Vec<u32>),
    CanvasHeight => display.canvas_height: Count(u32),
    CanvasWidth => display.canvas_width: Count(u32),
    Margin => display.margin: Number(f64),
    VisualSubdivisions => display.visual_subdivisions: Pattern(PatternInput),
    SubdivisionOffset => display.subdivision_offset: Number(f64),
    VisualGain => display.visual_gain: Number(f64),
}

impl Key {
    /// Whether changes to this key are pushed to the engine.
    pub fn partition(self) -> Partition {
        partition_of(self)
    }

    /// Whether changing this key invalidates the grid layout.
    pub fn affects_geometry(self) -> bool {
        matches!(
            self,
            Key::BeatsPerRow | Key::Margin | Key::CanvasWidth | Key::CanvasHeight
        )
    }

    /// Looks up a key by name. Accepts snake_case, camelCase or kebab-case.
    pub fn from_name(name: &str) -> Result<Key, ConfigError> {
        let mut normalized = String::with_capacity(name.len() + 4);
        for c in name.trim().chars() {
            if c.is_ascii_uppercase() {
                if !normalized.is_empty() {
                    normalized.push('_');
                }
                normalized.push(c.to_ascii_lowercase());
            } else if c == '-' {
                normalized.push('_');
            } else {
                normalized.push(c);
            }
        }

        Key::ALL
            .iter()
            .copied()
            .find(|key| key.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownKey(name.to_string()))
    }
}
