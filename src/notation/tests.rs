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
#[cfg(test)]
mod error_tests;
#[cfg(test)]
mod ratio_tests;

/// Compares note times with a tolerance, since thirds and sevenths don't land
/// on exact binary fractions.
#[cfg(test)]
fn assert_times(pattern: &super::CompiledPattern, expected: &[f64]) {
    let times: Vec<f64> = pattern.notes().iter().map(|note| note.time).collect();
    assert_eq!(
        expected.len(),
        times.len(),
        "expected {:?}, got {:?}",
        expected,
        times
    );
    for (expected, actual) in expected.iter().zip(times.iter()) {
        assert!(
            (expected - actual).abs() < 1e-9,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }
}
