//! Recursive-descent parser for the fixture notation.

use std::sync::Arc;

use super::lexer::{Token, TokenKind, lex, line_column};
use crate::composite::Composite;
use crate::context::Context;
use crate::document::Document;
use crate::error::{FixtureError, Result};
use crate::leaf::{Leaf, Segment};
use crate::node::Node;
use crate::tag::{BlockTag, TagSet};

/// Where a node appears; decides what bare quoted text becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Loose,
    Block,
}

/// Parses exactly one node.
pub fn parse_node(source: &str) -> Result<Node> {
    let tokens = lex(source)?;
    let mut parser = Parser::new(source, &tokens);
    let node = parser.node(Scope::Loose)?;
    parser.finish()?;
    Ok(node)
}

/// Parses a document: either a single `document<...>` node or a bare
/// sequence of contexts.
pub fn parse_document(source: &str) -> Result<Document> {
    let tokens = lex(source)?;
    let mut parser = Parser::new(source, &tokens);

    if parser.at_name("document") {
        let node = parser.node(Scope::Loose)?;
        parser.finish()?;
        return Ok(match node {
            Node::Document(document) => document,
            other => Document::new(vec![Arc::new(other)]),
        });
    }

    let mut children = Vec::new();
    while !parser.at_end() {
        children.push(Arc::new(parser.node(Scope::Block)?));
    }
    Ok(Document::new(children))
}

struct Parser<'t, 'input> {
    source: &'input str,
    tokens: &'t [Token<'input>],
    pos: usize,
}

impl<'t, 'input> Parser<'t, 'input> {
    fn new(source: &'input str, tokens: &'t [Token<'input>]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn current(&self) -> Option<&'t Token<'input>> {
        self.tokens.get(self.pos)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|t| t.kind == kind)
    }

    fn at_name(&self, name: &str) -> bool {
        self.current()
            .is_some_and(|t| t.kind == TokenKind::Name && t.text == name)
    }

    fn bump(&mut self) -> Option<&'t Token<'input>> {
        let token = self.current();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token<'input>> {
        if self.at(kind)
            && let Some(token) = self.bump()
        {
            return Ok(token);
        }
        Err(self.unexpected(kind.describe()))
    }

    /// Error for whatever is at the current position.
    fn unexpected(&self, expected: &'static str) -> FixtureError {
        match self.current() {
            Some(token) => {
                let (line, column) = line_column(self.source, token.span.start);
                FixtureError::UnexpectedToken {
                    found: token.text.to_string(),
                    expected,
                    line,
                    column,
                }
            }
            None => {
                let (line, column) = line_column(self.source, self.source.len());
                FixtureError::UnexpectedEnd {
                    expected,
                    line,
                    column,
                }
            }
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn node(&mut self, scope: Scope) -> Result<Node> {
        let Some(token) = self.current() else {
            return Err(self.unexpected("a node"));
        };
        match token.kind {
            TokenKind::Quoted => {
                self.pos += 1;
                let text = unescape(self.source, token)?;
                Ok(match scope {
                    Scope::Block => Node::Segment(Segment::untagged(&text)),
                    Scope::Loose => Node::Leaf(Leaf::new(&text)),
                })
            }
            TokenKind::LParen => {
                let tags = self.tags()?;
                let quoted = self.expect(TokenKind::Quoted)?;
                let text = unescape(self.source, quoted)?;
                Ok(Node::Segment(Segment::new(&text, tags)))
            }
            TokenKind::Name => self.named(token),
            _ => Err(self.unexpected("a node")),
        }
    }

    fn named(&mut self, token: &'t Token<'input>) -> Result<Node> {
        self.pos += 1;
        match token.text {
            "gap" => Ok(Node::Gap),
            "composite" => {
                let children = self.children(Scope::Loose)?;
                Ok(Node::Composite(Composite::new(children)))
            }
            "document" => {
                let children = self.children(Scope::Block)?;
                Ok(Node::Document(Document::new(children)))
            }
            name => {
                let Ok(block_tag) = name.parse::<BlockTag>() else {
                    let (line, column) = line_column(self.source, token.span.start);
                    return Err(FixtureError::UnknownNode {
                        name: name.to_string(),
                        line,
                        column,
                    });
                };
                let indentation = self.indentation()?;
                let children = self.children(Scope::Block)?;
                Ok(Node::Context(Context::new(block_tag, indentation, children)))
            }
        }
    }

    fn indentation(&mut self) -> Result<usize> {
        if !self.eat(TokenKind::At) {
            return Ok(0);
        }
        if let Some(token) = self.current()
            && token.kind == TokenKind::Number
            && let Ok(amount) = token.text.parse()
        {
            self.pos += 1;
            return Ok(amount);
        }
        Err(self.unexpected("an indentation amount"))
    }

    fn children(&mut self, scope: Scope) -> Result<Vec<Arc<Node>>> {
        self.expect(TokenKind::Lt)?;
        let mut children = Vec::new();
        while !self.eat(TokenKind::Gt) {
            if self.at_end() {
                return Err(self.unexpected("a node or '>'"));
            }
            children.push(Arc::new(self.node(scope)?));
        }
        Ok(children)
    }

    fn tags(&mut self) -> Result<TagSet> {
        self.expect(TokenKind::LParen)?;
        let mut tags = TagSet::new();
        if self.eat(TokenKind::RParen) {
            return Ok(tags);
        }
        loop {
            let name = self.expect(TokenKind::Name)?;
            tags.insert(name.text);
            if self.eat(TokenKind::RParen) {
                return Ok(tags);
            }
            if !self.eat(TokenKind::Comma) {
                return Err(self.unexpected("',' or ')'"));
            }
        }
    }
}

/// The text between the quotes with `\'` and `\\` resolved.
fn unescape(source: &str, token: &Token<'_>) -> Result<String> {
    let inner = &token.text[1..token.text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();
    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some((_, escaped @ ('\'' | '\\'))) => out.push(escaped),
            Some((_, found)) => {
                let (line, column) = line_column(source, token.span.start + 1 + offset);
                return Err(FixtureError::InvalidEscape {
                    found,
                    line,
                    column,
                });
            }
            None => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn quoted_text_depends_on_scope() {
        assert!(matches!(parse_node("'x'").unwrap(), Node::Leaf(_)));
        assert!(matches!(parse_node("()'x'").unwrap(), Node::Segment(_)));

        let paragraph = parse_node("p<'x'>").unwrap();
        assert!(paragraph.children()[0].as_segment().is_some());

        let composite = parse_node("composite<'x' (em)'y'>").unwrap();
        assert!(matches!(composite.children()[0].as_ref(), Node::Leaf(_)));
        assert!(matches!(composite.children()[1].as_ref(), Node::Segment(_)));
    }

    #[test]
    fn tags_and_indentation() {
        let node = parse_node("h2@3<(Strong, em)'x'>").unwrap();
        let context = node.as_context().unwrap();
        assert_eq!(context.block_tag(), BlockTag::Heading2);
        assert_eq!(context.indentation(), 3);
        let tags: Vec<_> = node.children()[0]
            .tags()
            .unwrap()
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();
        assert_eq!(tags, vec!["em", "strong"]);
    }

    #[test]
    fn escapes_resolve() {
        let node = parse_node(r"'it\'s a \\ path'").unwrap();
        assert_eq!(node.text(), r"it's a \ path");
    }

    #[test]
    fn document_with_or_without_wrapper() {
        let wrapped = parse_document("document<p<'a'> p<'b'>>").unwrap();
        let bare = parse_document("p<'a'>\np<'b'>").unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.children().len(), 2);
        assert_eq!(parse_document("").unwrap(), Document::default());
    }

    #[test]
    fn gap_needs_no_brackets() {
        let node = parse_node("composite<'a' gap 'b'>").unwrap();
        assert!(node.children()[1].is_gap());
    }

    #[rstest]
    #[case("p<'a' ?>", 7)]
    #[case(r"p<'a\q'>", 5)]
    #[case("marquee<>", 1)]
    #[case("p<'a'", 6)]
    #[case("p<> p<>", 5)]
    #[case("p@<>", 3)]
    #[case("(em 'x'", 5)]
    fn errors_name_the_column(#[case] source: &str, #[case] column: usize) {
        let err = parse_node(source).unwrap_err();
        assert_eq!(err.column(), column, "{err}");
    }

    #[test]
    fn error_variants() {
        assert_eq!(
            parse_node("marquee<>").unwrap_err(),
            FixtureError::UnknownNode {
                name: "marquee".to_string(),
                line: 1,
                column: 1,
            }
        );
        assert_eq!(
            parse_node(r"'\n'").unwrap_err(),
            FixtureError::InvalidEscape {
                found: 'n',
                line: 1,
                column: 2,
            }
        );
        assert!(matches!(
            parse_node("p<").unwrap_err(),
            FixtureError::UnexpectedEnd { .. }
        ));
    }
}
