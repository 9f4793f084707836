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
use crate::notation::tests::assert_times;
use crate::notation::*;

#[test]
fn test_two_over_one() {
    let pattern = compile("2:1").unwrap();
    assert_times(&pattern, &[0.0, 0.5]);
    assert_eq!(1.0, pattern.loop_length());
    assert_eq!("2:1", pattern.source_text());
}

#[test]
fn test_span_defaults_to_one_beat() {
    let pattern = compile("4").unwrap();
    assert_times(&pattern, &[0.0, 0.25, 0.5, 0.75]);
    assert_eq!(1.0, pattern.loop_length());
}

#[test]
fn test_groups_laid_end_to_end() {
    let pattern = compile("3:2|2").unwrap();
    assert_times(&pattern, &[0.0, 2.0 / 3.0, 4.0 / 3.0, 2.0, 2.5]);
    assert_eq!(3.0, pattern.loop_length());
}

#[test]
fn test_whitespace_is_ignored() {
    let spaced = compile("  3 : 2 |  2 ").unwrap();
    let tight = compile("3:2|2").unwrap();
    assert_eq!(tight.notes(), spaced.notes());
    assert_eq!(tight.loop_length(), spaced.loop_length());
}

#[test]
fn test_fractional_span() {
    let pattern = compile("2:.5|1:1.5").unwrap();
    assert_times(&pattern, &[0.0, 0.25, 0.5]);
    assert_eq!(2.0, pattern.loop_length());
}

#[test]
fn test_positional_tags() {
    let pattern = compile("3|2").unwrap();
    let notes = pattern.notes();

    assert!(notes[0].is_downbeat());
    assert!(notes[1].has_tag(SUBDIVISION));
    assert!(notes[2].has_tag(SUBDIVISION));
    assert!(notes[3].has_tag(BEAT));
    assert!(!notes[3].is_downbeat());
    assert!(notes[4].has_tag(SUBDIVISION));

    // Exactly one positional tag per note.
    for note in notes {
        let positional = [DOWNBEAT, BEAT, SUBDIVISION]
            .iter()
            .filter(|tag| note.has_tag(tag))
            .count();
        assert_eq!(1, positional);
    }
}

#[test]
fn test_compile_is_deterministic() {
    for text in ["2:1", "7:3|[!2@kick ~1 1]", "[1 1 2]:2|5"] {
        assert_eq!(compile(text).unwrap(), compile(text).unwrap());
    }
}

#[test]
fn test_maximum_count() {
    let pattern = compile(&MAX_COUNT.to_string()).unwrap();
    assert_eq!(MAX_COUNT as usize, pattern.notes().len());
}

#[test]
fn test_notes_sorted_within_loop() {
    let pattern = compile("5:3|[3 1 ~2 1]:2|7").unwrap();
    let notes = pattern.notes();
    for pair in notes.windows(2) {
        assert!(pair[0].time < pair[1].time);
    }
    for note in notes {
        assert!(note.time >= 0.0 && note.time < pattern.loop_length());
    }
}
