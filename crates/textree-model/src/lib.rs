//! # textree-model
//!
//! An immutable, boundary-addressed rich-text document model.
//!
//! A [`Document`] holds block [`Context`]s (paragraphs, headings, lists);
//! a text context holds tagged [`Segment`]s, and a heterogeneous context
//! (a list or list item) holds further contexts. Every edit returns a new
//! tree sharing the subtrees it did not touch.
//!
//! Positions are expressed in three address spaces, see [`node`]:
//! atom offsets, boundaries, and cursor positions.
//!
//! ```
//! use textree_model::{Document, TagSet};
//!
//! let document = Document::from_fixture("document<p<'Hello world'>>").unwrap();
//! let strong: TagSet = ["strong"].into_iter().collect();
//! let selection = document.selection(6, 11);
//! let edited = document.apply_tags(&strong, selection.start, selection.end);
//! assert_eq!(edited.to_fixture(), "document<p<'Hello ' (strong)'world'>>");
//! ```

pub mod composite;
pub mod context;
pub mod document;
pub mod error;
pub mod fixture;
pub mod html;
pub mod leaf;
mod list;
pub mod node;
pub mod operation;
pub mod tag;
pub mod visit;

pub use composite::Composite;
pub use context::{Attributes, Context, ContextKind};
pub use document::{Document, Selection};
pub use error::{FixtureError, UnknownBlockTag};
pub use html::{HtmlOptions, HtmlRenderer};
pub use leaf::{Leaf, Segment};
pub use node::{Atom, Measure, Node};
pub use operation::{ApplyTags, MapAtoms, Operation, RemoveTags, SetBlock, ToggleTags};
pub use tag::{BlockTag, Tag, TagSet};
pub use visit::Visitor;
