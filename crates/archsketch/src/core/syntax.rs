//! Line grammar for Python `diagrams` source
//!
//! Generated diagram code is line oriented: a cluster opener, a service
//! assignment, or a connection chain per line. Each line is classified into a
//! [`Statement`]; anything else is [`Statement::Other`].

use chumsky::prelude::*;
use chumsky::text::ident;

use super::catalog::{self, CatalogEntry};
use super::chumsky_utils::{
    inline_whitespace, inline_whitespace_required, label_keyword, rest_of_line, string_literal,
};

/// One classified source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `with Cluster("Name"):`
    ClusterOpen { name: Option<String> },
    /// `ident = Constructor("label", ...)`
    Assignment {
        ident: String,
        constructor: String,
        label: Option<String>,
    },
    /// `a >> b >> [c, d]`, tokens in flow order
    Chain(Vec<ChainToken>),
    Other,
}

/// One operand of a connection chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainToken {
    /// A bare identifier or a bracketed list of identifiers
    Names(Vec<String>),
    /// An `Edge(...)` styling operand; carries no endpoint
    Modifier,
    /// Any other expression, kept verbatim
    Expression(String),
}

/// Chumsky-based classifier for single source lines
#[derive(Debug, Default, Clone, Copy)]
pub struct LineParser;

impl LineParser {
    pub fn new() -> Self {
        Self
    }

    /// Classify one line; never fails
    pub fn parse_line(&self, line: &str) -> Statement {
        let code = strip_comment(line).trim();
        if code.is_empty() {
            return Statement::Other;
        }

        if let Ok(statement) = Self::cluster_parser()
            .or(Self::assignment_parser())
            .then_ignore(end())
            .parse(code)
            .into_result()
        {
            return statement;
        }

        if code.contains(">>") {
            return Statement::Chain(self.chain_tokens(code.split(">>")));
        }
        if code.contains("<<") {
            // `a << b` flows from b to a
            let mut tokens = self.chain_tokens(code.split("<<"));
            tokens.reverse();
            return Statement::Chain(tokens);
        }

        Statement::Other
    }

    /// True when the line opens a cluster
    pub fn is_cluster_open(&self, line: &str) -> bool {
        matches!(self.parse_line(line), Statement::ClusterOpen { .. })
    }

    fn chain_tokens<'a>(&self, parts: impl Iterator<Item = &'a str>) -> Vec<ChainToken> {
        let token = Self::token_parser().then_ignore(end());
        parts
            .map(str::trim)
            .map(|part| {
                token
                    .parse(part)
                    .into_result()
                    .unwrap_or_else(|_| ChainToken::Expression(part.to_string()))
            })
            .collect()
    }

    fn cluster_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        just("with")
            .then(inline_whitespace_required())
            .then(just("Cluster"))
            .then(inline_whitespace())
            .then(just('('))
            .then(inline_whitespace())
            .ignore_then(label_keyword().ignore_then(string_literal()).or_not())
            .then_ignore(rest_of_line())
            .map(|name| Statement::ClusterOpen { name })
    }

    fn assignment_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        ident()
            .map(|s: &str| s.to_string())
            .then_ignore(inline_whitespace())
            .then_ignore(just('='))
            .then_ignore(inline_whitespace())
            .then(ident().map(|s: &str| s.to_string()))
            .then_ignore(inline_whitespace())
            .then_ignore(just('('))
            .then_ignore(inline_whitespace())
            .then(label_keyword().ignore_then(string_literal()).or_not())
            .then_ignore(rest_of_line())
            .map(|((ident, constructor), label)| Statement::Assignment {
                ident,
                constructor,
                label,
            })
    }

    fn token_parser<'src>() -> impl Parser<'src, &'src str, ChainToken> + Clone {
        let name = ident().map(|s: &str| s.to_string());

        let modifier = just("Edge")
            .then(inline_whitespace())
            .then(just('('))
            .then(rest_of_line())
            .to(ChainToken::Modifier);

        let list = name
            .clone()
            .separated_by(just(',').padded_by(inline_whitespace()))
            .allow_trailing()
            .collect::<Vec<String>>()
            .delimited_by(
                just('[').then(inline_whitespace()),
                inline_whitespace().then(just(']')),
            )
            .map(ChainToken::Names);

        modifier
            .or(list)
            .or(name.map(|n| ChainToken::Names(vec![n])))
    }
}

/// Drop a trailing `#` comment, ignoring `#` inside string literals
pub fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match (quote, c) {
            (None, '#') => return &line[..i],
            (None, '"') | (None, '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
    }
    line
}

/// Catalog constructors called in `text`, in order of appearance
///
/// A match is a whole identifier immediately followed (after optional
/// spaces) by `(`. Dotted module prefixes are allowed.
pub fn constructor_calls(text: &str) -> Vec<&'static CatalogEntry> {
    let mut found = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if !(c.is_alphabetic() || c == '_') {
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if next.is_alphanumeric() || next == '_' {
                end = i + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let called = text[end..].trim_start_matches([' ', '\t']).starts_with('(');
        if called {
            if let Some(entry) = catalog::lookup(&text[start..end]) {
                found.push(entry);
            }
        }
    }

    found
}
