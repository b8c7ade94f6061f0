//! Expression Analyzer - guesses a summary method from a query target
//!
//! Dashboard widgets usually name a backend target such as
//! `sumSeries(servers.*.requests.sum)` without saying how its values should be
//! bucketed. The analyzer looks for metric-name leaves ending in a method
//! suffix (`.min`, `.max`, `.avg`, `.sum`, `.last`) and picks the first one it
//! finds, walking the expression outside-in and left to right.
//!
//! # Grammar
//!
//! ```text
//! expr    := item | func
//! func    := name '(' [arg (',' arg)*] ')'
//! arg     := expr | string
//! string  := '"' ... '"' | '\'' ... '\''     (backslash escapes)
//! ```
//!
//! The grammar is informal and backend specific, so the analyzer never
//! rejects input. Anything it cannot make sense of simply contributes no
//! candidate.
//!
//! # Rules
//!
//! - String literals are opaque; suffixes inside quotes are ignored.
//! - `integral(...)` always resolves to `max`. Its own candidate is queued
//!   ahead of whatever its argument yields, and the first candidate wins.
//!
//! # Example
//!
//! ```rust
//! use kuba_dash::aggregator::Aggregator;
//! use kuba_dash::expression::guess_method;
//! use kuba_dash::summarize::SummaryMethod;
//!
//! assert_eq!(
//!     guess_method("sum(foo.min)"),
//!     Some(SummaryMethod::Aggregate(Aggregator::Min))
//! );
//! assert_eq!(
//!     guess_method("integral(foo.sum)"),
//!     Some(SummaryMethod::Aggregate(Aggregator::Max))
//! );
//! assert_eq!(guess_method(r#"alias(foo, "bar.max")"#), None);
//! ```

use std::iter;

use nom::{
    branch::alt,
    bytes::complete::{escaped, take_till, take_till1, take_while},
    character::complete::{anychar, char, none_of, one_of},
    combinator::{map, opt, rest, value},
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

use crate::aggregator::Aggregator;
use crate::summarize::SummaryMethod;

/// Function whose result is always summarized with `max`
const INTEGRAL: &str = "integral";

/// Lexical token of a target expression
///
/// Nesting is expressed only through `Func`/`EndFunc` pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Opening of a function call, `name(`
    Func(String),

    /// Closing parenthesis
    EndFunc,

    /// Bare argument such as a metric path or a number
    Item(String),
}

/// Split a target expression into tokens
///
/// String literals are consumed without producing a token.
pub fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut input = expr;

    loop {
        input = match separators(input) {
            Ok((remaining, _)) => remaining,
            Err(_) => break,
        };
        if input.is_empty() {
            break;
        }

        // Every alternative consumes at least one character
        match lexeme(input) {
            Ok((remaining, token)) => {
                tokens.extend(token);
                input = remaining;
            }
            Err(_) => break,
        }
    }

    tokens
}

// ============================================================================
// Lexeme Parsers
// ============================================================================

/// One lexeme; `None` for input that yields no token
fn lexeme(input: &str) -> IResult<&str, Option<Token>> {
    alt((end_func, string_literal, func_open, item)).parse(input)
}

/// Commas and whitespace between arguments
fn separators(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c == ',' || c.is_whitespace()).parse(input)
}

fn end_func(input: &str) -> IResult<&str, Option<Token>> {
    value(Some(Token::EndFunc), char(')')).parse(input)
}

/// Quoted literal, discarded
///
/// An unterminated literal swallows the rest of the input.
fn string_literal(input: &str) -> IResult<&str, Option<Token>> {
    value(
        None,
        alt((
            delimited(
                char('"'),
                opt(escaped(none_of("\\\""), '\\', anychar)),
                char('"'),
            ),
            delimited(
                char('\''),
                opt(escaped(none_of("\\'"), '\\', anychar)),
                char('\''),
            ),
            preceded(one_of("\"'"), opt(rest)),
        )),
    )
    .parse(input)
}

/// Opening of a call, `name(`
fn func_open(input: &str) -> IResult<&str, Option<Token>> {
    map(terminated(take_till(is_delimiter), char('(')), |name: &str| {
        Some(Token::Func(name.trim().to_string()))
    })
    .parse(input)
}

/// Bare argument up to the next delimiter; a following ')' is left in place
fn item(input: &str) -> IResult<&str, Option<Token>> {
    map(take_till1(is_delimiter), |text: &str| {
        let text = text.trim();
        (!text.is_empty()).then(|| Token::Item(text.to_string()))
    })
    .parse(input)
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '(' | ')' | ',')
}

/// Guess the summary method intended by a target expression
///
/// Returns `None` when no leaf carries a recognizable suffix; callers fall
/// back to their configured default.
pub fn guess_method(expr: &str) -> Option<SummaryMethod> {
    analyze(tokenize(expr))
}

/// Resolve a token stream to the first candidate method
///
/// Each open function call owns a frame of candidates. Closing the call
/// reduces its frame to the first candidate found and hands that (possibly
/// absent) result to the enclosing frame.
pub fn analyze(tokens: Vec<Token>) -> Option<SummaryMethod> {
    let mut frames: Vec<Vec<Option<SummaryMethod>>> = vec![Vec::new()];

    // Sentinel EndFunc closes the outermost frame
    for token in tokens.into_iter().chain(iter::once(Token::EndFunc)) {
        match token {
            Token::Item(text) => {
                if let (Some(method), Some(frame)) = (suffix_method(&text), frames.last_mut()) {
                    frame.push(Some(method));
                }
            }
            Token::Func(name) => {
                if name == INTEGRAL {
                    if let Some(frame) = frames.last_mut() {
                        frame.push(Some(SummaryMethod::Aggregate(Aggregator::Max)));
                    }
                }
                frames.push(Vec::new());
            }
            Token::EndFunc => {
                if let Some(result) = close_frame(&mut frames) {
                    return result;
                }
            }
        }
    }

    // Unclosed calls are closed implicitly
    while !frames.is_empty() {
        if let Some(result) = close_frame(&mut frames) {
            return result;
        }
    }
    None
}

/// Pop the innermost frame
///
/// Returns `Some(result)` once the outermost frame has been closed.
fn close_frame(frames: &mut Vec<Vec<Option<SummaryMethod>>>) -> Option<Option<SummaryMethod>> {
    let result = frames.pop()?.into_iter().flatten().next();
    match frames.last_mut() {
        Some(parent) => {
            parent.push(result);
            None
        }
        None => Some(result),
    }
}

/// Method named by the last dotted component of a leaf, if any
fn suffix_method(text: &str) -> Option<SummaryMethod> {
    let suffix = text.rsplit('.').next()?;
    SummaryMethod::lookup(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(a: Aggregator) -> Option<SummaryMethod> {
        Some(SummaryMethod::Aggregate(a))
    }

    fn func(name: &str) -> Token {
        Token::Func(name.to_string())
    }

    fn item(text: &str) -> Token {
        Token::Item(text.to_string())
    }

    #[test]
    fn test_tokenize_nested() {
        assert_eq!(
            tokenize("foo(bar(baz.min), baz.max)"),
            vec![
                func("foo"),
                func("bar"),
                item("baz.min"),
                Token::EndFunc,
                item("baz.max"),
                Token::EndFunc,
            ]
        );
    }

    #[test]
    fn test_tokenize_discards_strings() {
        assert_eq!(
            tokenize(r#"somefunc("foo.max", foo.min)"#),
            vec![func("somefunc"), item("foo.min"), Token::EndFunc]
        );
        assert_eq!(
            tokenize(r#"f('', "a\"b", 'c\'d')"#),
            vec![func("f"), Token::EndFunc]
        );
    }

    #[test]
    fn test_tokenize_plain_items() {
        assert_eq!(tokenize("foo.max"), vec![item("foo.max")]);
        assert_eq!(
            tokenize("scale(foo.bar, 10)"),
            vec![func("scale"), item("foo.bar"), item("10"), Token::EndFunc]
        );
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ,  ").is_empty());
    }

    #[test]
    fn test_tokenize_delimiters_inside_strings() {
        assert_eq!(
            tokenize(r#"alias(foo.min, "a(b")"#),
            vec![func("alias"), item("foo.min"), Token::EndFunc]
        );
        assert_eq!(
            tokenize(r#"alias(foo.max, 'x), y')"#),
            vec![func("alias"), item("foo.max"), Token::EndFunc]
        );
    }

    #[test]
    fn test_tokenize_space_before_call() {
        assert_eq!(
            tokenize("integral (foo.sum)"),
            vec![func("integral"), item("foo.sum"), Token::EndFunc]
        );
        assert_eq!(guess_method("integral (foo.sum)"), agg(Aggregator::Max));
    }

    #[test]
    fn test_plain_suffixes() {
        assert_eq!(guess_method("foo.max"), agg(Aggregator::Max));
        assert_eq!(guess_method("foo.min"), agg(Aggregator::Min));
        assert_eq!(guess_method("foo.bar.avg"), agg(Aggregator::Avg));
        assert_eq!(guess_method("foo.sum"), agg(Aggregator::Sum));
        assert_eq!(guess_method("foo.last"), Some(SummaryMethod::Last));
    }

    #[test]
    fn test_no_suffix() {
        assert_eq!(guess_method("foo.bar"), None);
        assert_eq!(guess_method("foo.maximum"), None);
        assert_eq!(guess_method(""), None);
    }

    #[test]
    fn test_integral_forces_max() {
        assert_eq!(guess_method("integral(foo.sum)"), agg(Aggregator::Max));
        assert_eq!(guess_method("integral(foo.min)"), agg(Aggregator::Max));
        assert_eq!(guess_method("integral(foo)"), agg(Aggregator::Max));
    }

    #[test]
    fn test_function_names_are_not_leaves() {
        assert_eq!(guess_method("sum(foo.min)"), agg(Aggregator::Min));
        assert_eq!(guess_method("sum(foo)"), None);
    }

    #[test]
    fn test_quoted_leaves_ignored() {
        assert_eq!(
            guess_method(r#"somefunc("foo.max", foo.min)"#),
            agg(Aggregator::Min)
        );
        assert_eq!(
            guess_method(r#"foo(bar("baz.min"), baz.max)"#),
            agg(Aggregator::Max)
        );
    }

    #[test]
    fn test_first_candidate_wins() {
        assert_eq!(
            guess_method("foo(bar(baz.min), baz.max)"),
            agg(Aggregator::Min)
        );
        assert_eq!(guess_method("foo(a.sum, b.max)"), agg(Aggregator::Sum));
    }

    #[test]
    fn test_integral_nested_inside_other_call() {
        assert_eq!(
            guess_method("alias(integral(foo.min), bar.sum)"),
            agg(Aggregator::Max)
        );
        assert_eq!(
            guess_method("alias(foo.min, integral(bar.sum))"),
            agg(Aggregator::Min)
        );
    }

    #[test]
    fn test_malformed_input_is_best_effort() {
        assert_eq!(guess_method("foo(bar.min"), agg(Aggregator::Min));
        assert_eq!(guess_method("foo.max))"), agg(Aggregator::Max));
        assert_eq!(guess_method(r#"foo("unterminated.max"#), None);
        assert_eq!(guess_method(")))((("), None);
    }
}
