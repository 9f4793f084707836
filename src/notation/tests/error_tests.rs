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
use crate::notation::*;

#[test]
fn test_empty_pattern() {
    let result = compile("");
    assert!(matches!(result, Err(ParseError::Syntax { .. })));
}

#[test]
fn test_syntax_error_shows_context() {
    let Err(ParseError::Syntax { context, .. }) = compile("2:x") else {
        panic!("expected a syntax error");
    };
    assert!(context.starts_with("  2:x\n"));
    assert!(context.ends_with('^'));
}

#[test]
fn test_unterminated_weights() {
    assert!(matches!(compile("[1 1"), Err(ParseError::Syntax { .. })));
}

#[test]
fn test_trailing_separator() {
    assert!(matches!(compile("2|"), Err(ParseError::Syntax { .. })));
}

#[test]
fn test_zero_count() {
    assert_eq!(Err(ParseError::Count("0".to_string())), compile("0"));
}

#[test]
fn test_count_too_large() {
    let text = (MAX_COUNT + 1).to_string();
    assert_eq!(Err(ParseError::Count(text.clone())), compile(&text));
    assert!(matches!(
        compile("99999999999"),
        Err(ParseError::Count(_))
    ));
}

#[test]
fn test_zero_span() {
    assert_eq!(
        Err(ParseError::NonPositive {
            what: "span",
            value: "0".to_string()
        }),
        compile("2:0")
    );
}

#[test]
fn test_span_too_short() {
    assert_eq!(
        Err(ParseError::SpanTooShort("0.000000001".to_string())),
        compile("1:0.000000001")
    );
    assert!(matches!(
        compile("2:1|4:.001"),
        Err(ParseError::SpanTooShort(_))
    ));
    assert!(compile(&format!("4:{}", MIN_SPAN)).is_ok());
}

#[test]
fn test_zero_weight() {
    assert!(matches!(
        compile("[0 1]"),
        Err(ParseError::NonPositive { what: "weight", .. })
    ));
    assert!(matches!(
        compile("[1 ~0.0]"),
        Err(ParseError::NonPositive { what: "weight", .. })
    ));
}

#[test]
fn test_only_rests() {
    assert_eq!(Err(ParseError::NoHits), compile("[~ ~2]"));
}

#[test]
fn test_too_many_notes() {
    let text = vec![MAX_COUNT.to_string(); 5].join("|");
    assert_eq!(
        Err(ParseError::TooManyNotes(5 * MAX_COUNT as usize)),
        compile(&text)
    );
}

#[test]
fn test_error_messages_are_readable() {
    let message = compile("0").unwrap_err().to_string();
    assert!(message.contains("between 1 and 256"), "{}", message);

    let message = compile("[~]").unwrap_err().to_string();
    assert_eq!("pattern contains only rests", message);
}
