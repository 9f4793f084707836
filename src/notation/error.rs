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
use pest::error::{Error as PestError, LineColLocation};

use super::grammar::Rule;

/// The largest count accepted by an even subdivision such as `7:2`.
pub const MAX_COUNT: u32 = 256;

/// The largest number of notes a single pattern may compile to.
pub const MAX_NOTES: usize = 1024;

/// The shortest span, in beats, a group may cover.
pub const MIN_SPAN: f64 = 1.0 / 64.0;

/// Why a pattern failed to compile. A failed compile never produces a partial
/// pattern; callers keep whatever they compiled last.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("rhythm syntax error at column {column}: {message}\n{context}")]
    Syntax {
        column: usize,
        message: String,
        context: String,
    },

    #[error("subdivision count '{0}' must be between 1 and {max}", max = MAX_COUNT)]
    Count(String),

    #[error("{what} '{value}' must be a positive, finite number")]
    NonPositive { what: &'static str, value: String },

    #[error("span '{0}' is shorter than the {min} beat minimum", min = MIN_SPAN)]
    SpanTooShort(String),

    #[error("pattern contains only rests")]
    NoHits,

    #[error("pattern compiles to {0} notes, more than the {max} allowed", max = MAX_NOTES)]
    TooManyNotes(usize),
}

impl ParseError {
    pub(super) fn syntax(content: &str, error: PestError<Rule>) -> ParseError {
        let (line, column) = match error.line_col {
            LineColLocation::Pos((line, col)) => (line, col),
            LineColLocation::Span((line, col), _) => (line, col),
        };
        ParseError::Syntax {
            column,
            message: error.variant.message().to_string(),
            context: error_context(content, line, column),
        }
    }
}

/// Renders the offending line with a caret under the error column.
pub(crate) fn error_context(content: &str, line: usize, col: usize) -> String {
    // An empty pattern has no lines, but pest still reports 1:1.
    let error_line = if content.is_empty() {
        ""
    } else {
        match content.lines().nth(line.saturating_sub(1)) {
            Some(error_line) => error_line,
            None => return "Unable to determine error context".to_string(),
        }
    };

    format!("  {}\n  {}^", error_line, " ".repeat(col.saturating_sub(1)))
}

#[cfg(test)]
mod test {
    use super::error_context;

    #[test]
    fn test_error_context_points_at_column() {
        assert_eq!("  2:x\n    ^", error_context("2:x", 1, 3));
        assert_eq!("  [1 1\n  ^", error_context("[1 1", 1, 1));
    }

    #[test]
    fn test_error_context_empty_content() {
        assert_eq!("  \n  ^", error_context("", 1, 1));
    }

    #[test]
    fn test_error_context_line_out_of_range() {
        assert_eq!(
            "Unable to determine error context",
            error_context("2:1", 3, 1)
        );
    }
}
