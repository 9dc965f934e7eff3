//! # Fixture - A Textual Notation for Trees
//!
//! Tests and tooling describe trees in a small bracket language rather than
//! by chaining constructors:
//!
//! ```text
//! # a heading, then a list with a nested list
//! document<
//!   h1<'Title'>
//!   ul<
//!     li<p<'plain ' (em, strong)'loud'>>
//!     li<p<'parent'> ol<li<'child'>>>
//!   >
//!   p@2<'indented twice'>
//! >
//! ```
//!
//! ## Grammar
//!
//! ```text
//! node      := quoted | tags quoted | name ['@' number] '<' node* '>'
//! tags      := '(' [name {',' name}] ')'
//! quoted    := "'" { char | "\'" | "\\" } "'"
//! ```
//!
//! A `name` is a block tag (`p`, `h1`..`h6`, `blockquote`, `pre`, `ul`,
//! `ol`, `li`), or one of `composite`, `document` and `gap` (which takes no
//! brackets). `@n` sets a context's indentation.
//!
//! Quoted text becomes a segment inside a context or a document, and a plain
//! leaf anywhere else; a tag list, even an empty `()`, always makes a
//! segment. `#` starts a comment running to the end of the line and
//! whitespace between tokens is ignored.
//!
//! ## Printing
//!
//! [`print_node`] writes the canonical form: no whitespace except a single
//! space between siblings that are not both contexts, tags only where
//! needed, and `@n` only when the indentation is non-zero. Printing then
//! parsing gives back a structurally equal tree.
//!
//! ```
//! use textree_model::fixture::{parse_node, print_node};
//!
//! let node = parse_node("p< 'a'  (em)'b' >").unwrap();
//! assert_eq!(print_node(&node), "p<'a' (em)'b'>");
//! ```

mod lexer;
mod parser;
mod printer;

pub use parser::{parse_document, parse_node};
pub use printer::print_node;
