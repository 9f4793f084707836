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
use std::collections::BTreeSet;

use serde::Serialize;

/// Tag carried by the note that opens the loop.
pub const DOWNBEAT: &str = "downbeat";
/// Tag carried by the first note of every group after the first.
pub const BEAT: &str = "beat";
/// Tag carried by every other note.
pub const SUBDIVISION: &str = "subdivision";
/// Tag added by a `!` prefix.
pub const ACCENT: &str = "accent";

/// A single note inside a compiled loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    /// Offset in beats from the start of the loop, in `[0, loop_length)`.
    pub time: f64,
    /// Positional tag plus any accent or sound tags.
    pub tags: BTreeSet<String>,
}

impl Note {
    pub(super) fn new(time: f64, tags: impl IntoIterator<Item = String>) -> Note {
        Note {
            time,
            tags: tags.into_iter().collect(),
        }
    }

    /// Returns true if the note carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Returns true if the note opens the loop.
    pub fn is_downbeat(&self) -> bool {
        self.has_tag(DOWNBEAT)
    }
}

/// The result of compiling rhythm notation: notes sorted by time within a
/// repeating loop, along with the text they were compiled from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledPattern {
    notes: Vec<Note>,
    loop_length: f64,
    source_text: String,
}

impl CompiledPattern {
    pub(super) fn new(notes: Vec<Note>, loop_length: f64, source_text: &str) -> CompiledPattern {
        CompiledPattern {
            notes,
            loop_length,
            source_text: source_text.to_string(),
        }
    }

    /// Gets the notes, sorted by time.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Gets the loop length in beats.
    pub fn loop_length(&self) -> f64 {
        self.loop_length
    }

    /// Gets the exact text this pattern was compiled from.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Every note instance whose absolute beat falls in `[start, end)`, with the
    /// loop repeated from beat zero in both directions.
    pub fn occurrences(&self, start: f64, end: f64) -> Vec<(f64, &Note)> {
        let mut occurrences = Vec::new();
        if !(start.is_finite() && end.is_finite()) || end <= start || self.notes.is_empty() {
            return occurrences;
        }

        let mut repetition = (start / self.loop_length).floor();
        while repetition * self.loop_length < end {
            let loop_start = repetition * self.loop_length;
            for note in self.notes.iter() {
                let beat = loop_start + note.time;
                if beat >= start && beat < end {
                    occurrences.push((beat, note));
                }
            }
            repetition += 1.0;
        }

        occurrences
    }
}

impl Default for CompiledPattern {
    /// Two even notes over a single beat, the same as compiling `2:1`.
    fn default() -> Self {
        CompiledPattern::new(
            vec![
                Note::new(0.0, [DOWNBEAT.to_string()]),
                Note::new(0.5, [SUBDIVISION.to_string()]),
            ],
            1.0,
            "2:1",
        )
    }
}

#[cfg(test)]
mod test {
    use crate::notation::compile;

    use super::*;

    #[test]
    fn test_default_matches_compiled_text() {
        assert_eq!(CompiledPattern::default(), compile("2:1").unwrap());
    }

    #[test]
    fn test_occurrences_repeat_the_loop() {
        let pattern = compile("2:1").unwrap();
        let beats: Vec<f64> = pattern
            .occurrences(0.0, 2.0)
            .into_iter()
            .map(|(beat, _)| beat)
            .collect();
        assert_eq!(vec![0.0, 0.5, 1.0, 1.5], beats);
    }

    #[test]
    fn test_occurrences_respect_range_bounds() {
        let pattern = compile("4:2").unwrap();
        let beats: Vec<f64> = pattern
            .occurrences(0.5, 3.0)
            .into_iter()
            .map(|(beat, _)| beat)
            .collect();
        assert_eq!(vec![0.5, 1.0, 1.5, 2.0, 2.5], beats);

        let negative: Vec<f64> = pattern
            .occurrences(-1.0, 0.0)
            .into_iter()
            .map(|(beat, _)| beat)
            .collect();
        assert_eq!(vec![-1.0, -0.5], negative);
    }

    #[test]
    fn test_occurrences_empty_range() {
        let pattern = CompiledPattern::default();
        assert!(pattern.occurrences(2.0, 2.0).is_empty());
        assert!(pattern.occurrences(3.0, 1.0).is_empty());
        assert!(pattern.occurrences(0.0, f64::INFINITY).is_empty());
    }

    #[test]
    fn test_downbeat_tag() {
        let pattern = CompiledPattern::default();
        assert!(pattern.notes()[0].is_downbeat());
        assert!(pattern.notes()[1].has_tag(SUBDIVISION));
        assert!(!pattern.notes()[1].is_downbeat());
    }
}
