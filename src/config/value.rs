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
use std::fmt;

use crate::notation::{self, CompiledPattern, ParseError};

/// The shape of a config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Count,
    Toggle,
    Counts,
    Pattern,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Number => "number",
            ValueKind::Count => "count",
            ValueKind::Toggle => "toggle",
            ValueKind::Counts => "list of counts",
            ValueKind::Pattern => "rhythm pattern",
        };
        write!(f, "{}", name)
    }
}

/// A rhythm pattern as the user typed it, alongside the last text that
/// compiled successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternInput {
    text: String,
    compiled: CompiledPattern,
}

impl PatternInput {
    /// Compiles a new pattern input.
    pub fn parse(text: &str) -> Result<PatternInput, ParseError> {
        Ok(PatternInput {
            text: text.to_string(),
            compiled: notation::compile(text)?,
        })
    }

    /// The text as last typed, which may not compile.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The last successful compilation.
    pub fn compiled(&self) -> &CompiledPattern {
        &self.compiled
    }

    /// Returns true if the displayed text hasn't compiled yet.
    pub fn is_pending(&self) -> bool {
        self.text != self.compiled.source_text()
    }

    /// Replaces the text and recompiles it. On failure the text is still
    /// replaced, so editing can continue, but the compiled pattern is kept.
    pub fn edit(&mut self, text: &str) -> Result<(), ParseError> {
        self.text = text.to_string();
        self.compiled = notation::compile(text)?;
        Ok(())
    }
}

impl Default for PatternInput {
    fn default() -> Self {
        let compiled = CompiledPattern::default();
        PatternInput {
            text: compiled.source_text().to_string(),
            compiled,
        }
    }
}

/// A config value of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Count(u32),
    Toggle(bool),
    Counts(Vec<u32>),
    Pattern(PatternInput),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Count(_) => ValueKind::Count,
            Value::Toggle(_) => ValueKind::Toggle,
            Value::Counts(_) => ValueKind::Counts,
            Value::Pattern(_) => ValueKind::Pattern,
        }
    }

    /// Parses text typed into a widget or given on the command line. Patterns
    /// are compiled in full; a failed compile is an error here.
    pub fn parse(kind: ValueKind, text: &str) -> Result<Value, String> {
        let text = text.trim();
        match kind {
            ValueKind::Number => text
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|e| e.to_string()),
            ValueKind::Count => text
                .parse::<u32>()
                .map(Value::Count)
                .map_err(|e| e.to_string()),
            ValueKind::Toggle => match text.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(Value::Toggle(true)),
                "false" | "off" | "no" | "0" => Ok(Value::Toggle(false)),
                _ => Err(format!("'{}' is not on or off", text)),
            },
            ValueKind::Counts => text
                .trim_start_matches('[')
                .trim_end_matches(']')
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .map(|part| part.parse::<u32>().map_err(|e| format!("'{}': {}", part, e)))
                .collect::<Result<Vec<u32>, String>>()
                .map(Value::Counts),
            ValueKind::Pattern => PatternInput::parse(text)
                .map(Value::Pattern)
                .map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(number) => write!(f, "{}", number),
            Value::Count(count) => write!(f, "{}", count),
            Value::Toggle(toggle) => write!(f, "{}", toggle),
            Value::Counts(counts) => write!(
                f,
                "{}",
                counts
                    .iter()
                    .map(|count| count.to_string())
                    .collect::<Vec<String>>()
                    .join(",")
            ),
            Value::Pattern(pattern) => write!(f, "{}", pattern.text()),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Count(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Toggle(value)
    }
}

impl From<Vec<u32>> for Value {
    fn from(value: Vec<u32>) -> Self {
        Value::Counts(value)
    }
}

impl From<PatternInput> for Value {
    fn from(value: PatternInput) -> Self {
        Value::Pattern(value)
    }
}
