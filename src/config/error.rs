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
use crate::{grid::LayoutError, notation::ParseError};

use super::ValueKind;

/// Why a settings file couldn't be loaded or a config change was refused. A
/// refused change never alters the stored value, with the one exception of a
/// pattern's raw text.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load/parse error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid {field} '{value}': {reason}")]
    Duration {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("{key} expects a {expected}, not a {found}")]
    TypeMismatch {
        key: &'static str,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("{key} must be finite, got {value}")]
    NotFinite { key: &'static str, value: f64 },

    #[error("invalid value '{text}' for {key}: {reason}")]
    InvalidText {
        key: &'static str,
        text: String,
        reason: String,
    },

    #[error("pattern for {key} did not compile: {source}")]
    Pattern {
        key: &'static str,
        source: ParseError,
    },

    #[error("rejected grid geometry: {0}")]
    Layout(#[from] LayoutError),
}
