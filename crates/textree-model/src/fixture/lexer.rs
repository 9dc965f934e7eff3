//! Tokenizer for the fixture notation.
//!
//! Unlike a source-preserving lexer this one discards whitespace and `#`
//! comments: the notation has no layout to round-trip.

use std::ops::Range;

use logos::Logos;

use crate::error::{FixtureError, Result};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n\f]+|#[^\n]*)")]
pub enum TokenKind {
    /// Node names and tag labels
    #[regex(r"[A-Za-z][A-Za-z0-9_-]*")]
    Name,

    /// Indentation amounts
    #[regex(r"[0-9]+")]
    Number,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token("@")]
    At,

    /// Single-quoted text, escapes still in place
    #[regex(r"'([^'\\]|\\.)*'")]
    Quoted,
}

impl TokenKind {
    /// How the token is named in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Name => "a name",
            TokenKind::Number => "a number",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::At => "'@'",
            TokenKind::Quoted => "quoted text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Range<usize>,
}

pub fn lex(input: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        match result {
            Ok(kind) => tokens.push(Token { kind, text, span }),
            Err(()) => {
                let (line, column) = line_column(input, span.start);
                return Err(FixtureError::UnexpectedCharacter {
                    found: text.chars().next().unwrap_or_default(),
                    line,
                    column,
                });
            }
        }
    }

    Ok(tokens)
}

/// 1-based line and column (in characters) of byte offset `offset`.
pub fn line_column(input: &str, offset: usize) -> (usize, usize) {
    let before = &input[..offset.min(input.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |last| last.chars().count())
        + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex("").unwrap(), vec![]);
    }

    #[test]
    fn lex_context() {
        assert_eq!(
            kinds("p@2<(em, strong)'x'>"),
            vec![
                TokenKind::Name,
                TokenKind::At,
                TokenKind::Number,
                TokenKind::Lt,
                TokenKind::LParen,
                TokenKind::Name,
                TokenKind::Comma,
                TokenKind::Name,
                TokenKind::RParen,
                TokenKind::Quoted,
                TokenKind::Gt,
            ]
        );
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        let tokens = lex("# leading comment\n  p <\t'a' # trailing\n >").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["p", "<", "'a'", ">"]);
    }

    #[test]
    fn hash_inside_quotes_is_text() {
        let tokens = lex("'# not a comment'").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "'# not a comment'");
    }

    #[test]
    fn escaped_quotes_stay_in_one_token() {
        let tokens = lex(r"'it\'s' 'a\\b'").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec![r"'it\'s'", r"'a\\b'"]);
    }

    #[test]
    fn unknown_characters_report_their_position() {
        assert_eq!(
            lex("p<\n  ?>"),
            Err(FixtureError::UnexpectedCharacter {
                found: '?',
                line: 2,
                column: 3,
            })
        );
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        assert_eq!(line_column("'é' x", 5), (1, 5));
    }
}
