//! Shared chumsky parser utilities for Python diagram source

use chumsky::prelude::*;

/// Parse inline whitespace only (spaces and tabs, no newlines).
///
/// Uses explicit character matching to avoid the "repeated combinator making
/// no progress" issue with `chumsky::text::whitespace().repeated()`.
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t").repeated().ignored()
}

/// Parse required inline whitespace (at least one space or tab).
pub fn inline_whitespace_required<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t").repeated().at_least(1).ignored()
}

/// Parse a single- or double-quoted Python string literal without escapes.
pub fn string_literal<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    let double = just('"')
        .ignore_then(none_of("\"\n").repeated().collect::<String>())
        .then_ignore(just('"'));
    let single = just('\'')
        .ignore_then(none_of("'\n").repeated().collect::<String>())
        .then_ignore(just('\''));
    double.or(single)
}

/// Parse an optional `label=` keyword prefix.
pub fn label_keyword<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    just("label")
        .then(inline_whitespace())
        .then(just('='))
        .then(inline_whitespace())
        .ignored()
        .or_not()
        .ignored()
}

/// Consume the rest of the line.
pub fn rest_of_line<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    any().repeated().ignored()
}
