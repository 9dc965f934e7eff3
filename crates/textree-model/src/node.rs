//! The polymorphic [`Node`] and the address-space conversions every variant
//! supports.
//!
//! ## Address spaces
//!
//! - **atom index** `0..=length`: positions between characters. Empty nodes
//!   own no atom positions and are skipped.
//! - **boundary index** `0..boundaries_length`: every addressable point. A
//!   leaf with `n` atoms has `n + 1`; a composite sums its children, and an
//!   empty composite still has exactly one.
//! - **cursor index** `0..total_cursor_positions`: boundaries with the
//!   visually redundant ones removed. Inside a context made only of segments,
//!   the end of one segment and the start of the next are the same cursor.
//!
//! Mapping boundary to cursor is many-to-one, so the reverse direction takes
//! a `favor_left` flag choosing the first or last equivalent boundary.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::composite::{self, Composite};
use crate::context::Context;
use crate::document::Document;
use crate::leaf::{Leaf, Segment};
use crate::operation::{ApplyTags, Operation, RemoveTags, ToggleTags};
use crate::tag::{BlockTag, TagSet};
use crate::visit::Visitor;

/// An indivisible unit of content.
pub type Atom = char;

static NO_TAGS: TagSet = TagSet::new();

/// Any node of a document tree.
///
/// Nodes are immutable: every edit returns a new node, and children are held
/// behind `Arc` so an edited tree shares every subtree the edit did not touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Leaf(Leaf),
    Segment(Segment),
    Composite(Composite),
    Context(Context),
    Document(Document),
    /// Zero-width sentinel used while a document delete merges paragraphs.
    Gap,
}

/// Derived sizes of a composite, computed once when the composite is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub length: usize,
    pub boundaries_length: usize,
    pub over_count: usize,
}

impl Measure {
    pub(crate) fn of(children: &[Arc<Node>]) -> Self {
        if children.is_empty() {
            return Measure {
                length: 0,
                boundaries_length: 1,
                over_count: 0,
            };
        }
        children.iter().fold(Measure::default(), |sum, child| Measure {
            length: sum.length + child.length(),
            boundaries_length: sum.boundaries_length + child.boundaries_length(),
            over_count: sum.over_count + child.over_count(),
        })
    }
}

impl Node {
    pub fn leaf(text: &str) -> Node {
        Node::Leaf(Leaf::new(text))
    }

    pub fn segment(text: &str, tags: TagSet) -> Node {
        Node::Segment(Segment::new(text, tags))
    }

    pub fn composite(children: Vec<Node>) -> Node {
        Node::Composite(Composite::new(children.into_iter().map(Arc::new).collect()))
    }

    pub fn context(block_tag: BlockTag, children: Vec<Node>) -> Node {
        Node::Context(Context::new(
            block_tag,
            0,
            children.into_iter().map(Arc::new).collect(),
        ))
    }

    pub fn length(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.len(),
            Node::Segment(segment) => segment.len(),
            Node::Composite(composite) => composite.measure().length,
            Node::Context(context) => context.measure().length,
            Node::Document(document) => document.measure().length,
            Node::Gap => 0,
        }
    }

    pub fn boundaries_length(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.len() + 1,
            Node::Segment(segment) => segment.len() + 1,
            Node::Composite(composite) => composite.measure().boundaries_length,
            Node::Context(context) => context.measure().boundaries_length,
            Node::Document(document) => document.measure().boundaries_length,
            Node::Gap => 1,
        }
    }

    /// Boundaries that do not correspond to a distinct cursor position.
    pub fn over_count(&self) -> usize {
        match self {
            Node::Leaf(_) | Node::Segment(_) | Node::Gap => 0,
            Node::Composite(composite) => composite.measure().over_count,
            Node::Context(context) => context.measure().over_count,
            Node::Document(document) => document.measure().over_count,
        }
    }

    pub fn total_cursor_positions(&self) -> usize {
        self.boundaries_length() - self.over_count()
    }

    pub fn children(&self) -> &[Arc<Node>] {
        match self {
            Node::Composite(composite) => composite.children(),
            Node::Context(context) => context.children(),
            Node::Document(document) => document.children(),
            Node::Leaf(_) | Node::Segment(_) | Node::Gap => &[],
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, Node::Gap)
    }

    pub fn is_context(&self) -> bool {
        matches!(self, Node::Context(_))
    }

    pub fn as_context(&self) -> Option<&Context> {
        match self {
            Node::Context(context) => Some(context),
            _ => None,
        }
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Node::Segment(segment) => Some(segment),
            _ => None,
        }
    }

    /// Inline tags, if this is a segment.
    pub fn tags(&self) -> Option<&TagSet> {
        self.as_segment().map(Segment::tags)
    }

    pub fn atoms(&self) -> Vec<Atom> {
        let mut out = Vec::with_capacity(self.length());
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms(&self, out: &mut Vec<Atom>) {
        match self {
            Node::Leaf(leaf) => out.extend_from_slice(leaf.atoms()),
            Node::Segment(segment) => out.extend_from_slice(segment.atoms()),
            Node::Gap => {}
            _ => {
                for child in self.children() {
                    child.collect_atoms(out);
                }
            }
        }
    }

    /// The string projection: all atoms in order, no separators.
    pub fn text(&self) -> String {
        self.atoms().into_iter().collect()
    }

    /// Rebuilds this node's variant around new children, through the
    /// variant's factory. Leaves and gaps have no children and come back
    /// unchanged.
    pub(crate) fn with_children(&self, children: Vec<Arc<Node>>) -> Node {
        match self {
            Node::Composite(_) => Node::Composite(Composite::new(children)),
            Node::Context(context) => Node::Context(context.with_children(children)),
            Node::Document(_) => Node::Document(Document::new(children)),
            Node::Leaf(_) | Node::Segment(_) | Node::Gap => self.clone(),
        }
    }

    /// Children to write into: an empty composite first gains the single
    /// empty child text can be addressed in. An empty list gains an item.
    pub(crate) fn seeded_children(&self) -> Vec<Arc<Node>> {
        let children = self.children();
        if !children.is_empty() {
            return children.to_vec();
        }
        let seed = match self {
            Node::Context(context) if context.block_tag().is_list() => {
                Node::Context(Context::empty(BlockTag::ListItem))
            }
            Node::Context(_) => Node::Segment(Segment::default()),
            Node::Document(_) => Node::Context(Context::empty(BlockTag::Paragraph)),
            _ => Node::Leaf(Leaf::default()),
        };
        vec![Arc::new(seed)]
    }

    fn is_text_context(&self) -> bool {
        matches!(self, Node::Context(context) if context.is_text() && !context.children().is_empty())
    }

    /// Splits into two halves at atom offset `at`.
    pub fn split_at(&self, at: usize) -> (Node, Node) {
        match self {
            Node::Leaf(leaf) => {
                let (left, right) = leaf.split_at(at);
                (Node::Leaf(left), Node::Leaf(right))
            }
            Node::Segment(segment) => {
                let (left, right) = segment.split_at(at);
                (Node::Segment(left), Node::Segment(right))
            }
            Node::Gap => (Node::Gap, Node::Gap),
            _ => {
                let (left, right) = composite::split_children(self.children(), at);
                (self.with_children(left), self.with_children(right))
            }
        }
    }

    /// Splits the child holding atom offset `at` in place, giving a node of
    /// the same variant with one more top-level child. A leaf has no children
    /// to hold the pieces, so its halves come back in a [`Composite`].
    pub fn split(&self, at: usize) -> Node {
        match self {
            Node::Leaf(_) | Node::Segment(_) => {
                let (left, right) = self.split_at(at);
                Node::Composite(Composite::new(vec![Arc::new(left), Arc::new(right)]))
            }
            Node::Gap => Node::Gap,
            _ => self.with_children(composite::split(self.children(), at)),
        }
    }

    /// Replaces `remove` children starting at `start` with `children`.
    pub fn splice(&self, start: usize, remove: usize, children: Vec<Arc<Node>>) -> Node {
        self.with_children(composite::splice(self.children(), start, remove, children))
    }

    /// Removes the atoms in `start..end`.
    ///
    /// Within a composite, children straddling a bound are split and only the
    /// outside halves survive; nothing is merged back together.
    pub fn delete(&self, start: usize, end: usize) -> Node {
        let end = end.min(self.length());
        let start = start.min(end);
        if start == end {
            return self.clone();
        }
        match self {
            Node::Leaf(leaf) => Node::Leaf(leaf.delete(start, end)),
            Node::Segment(segment) => Node::Segment(segment.delete(start, end)),
            Node::Gap => Node::Gap,
            _ => self.with_children(composite::delete(self.children(), start, end)),
        }
    }

    /// Inserts `text` at atom offset `at`.
    pub fn insert(&self, at: usize, text: &str) -> Node {
        let atoms: Vec<Atom> = text.chars().collect();
        self.insert_atoms(at, &atoms)
    }

    pub fn insert_atoms(&self, at: usize, atoms: &[Atom]) -> Node {
        match self {
            Node::Leaf(leaf) => Node::Leaf(leaf.insert(at, atoms)),
            Node::Segment(segment) => Node::Segment(segment.insert(at, atoms)),
            Node::Gap => Node::Gap,
            _ => {
                let children = self.seeded_children();
                let at = at.min(self.length());
                self.with_children(composite::insert(&children, at, atoms))
            }
        }
    }

    /// Applies `operation` to the whole node.
    pub fn map(&self, operation: &dyn Operation) -> Node {
        match self {
            Node::Leaf(leaf) => Node::Leaf(operation.leaf(leaf)),
            Node::Segment(segment) => Node::Segment(operation.segment(segment)),
            Node::Gap => Node::Gap,
            Node::Context(context) => match operation.context(context) {
                Some(done) => Node::Context(done),
                None => self.with_children(map_children(self.children(), operation)),
            },
            Node::Composite(_) | Node::Document(_) => {
                self.with_children(map_children(self.children(), operation))
            }
        }
    }

    /// Applies `operation` to the atoms in `start..end`, splitting leaves at
    /// the bounds so atoms outside the range are untouched.
    pub fn operate(&self, operation: &dyn Operation, start: usize, end: usize) -> Node {
        let end = end.min(self.length());
        let start = start.min(end);
        if start == end {
            return self.clone();
        }
        match self {
            Node::Gap => Node::Gap,
            Node::Leaf(_) | Node::Segment(_) => {
                if start == 0 && end == self.length() {
                    return self.map(operation);
                }
                let pieces = composite::operate(&[Arc::new(self.clone())], operation, start, end);
                Node::Composite(Composite::new(pieces))
            }
            Node::Context(context) => match operation.context(context) {
                Some(done) => Node::Context(done),
                None => {
                    self.with_children(composite::operate(self.children(), operation, start, end))
                }
            },
            Node::Composite(_) | Node::Document(_) => {
                self.with_children(composite::operate(self.children(), operation, start, end))
            }
        }
    }

    /// Adds `tags` to the segments in atoms `start..end`. Adjacent segments
    /// are never merged, even when their tags become equal.
    pub fn apply_tags(&self, tags: &TagSet, start: usize, end: usize) -> Node {
        self.operate_tags(&ApplyTags(tags.clone()), tags, start, end)
    }

    pub fn remove_tags(&self, tags: &TagSet, start: usize, end: usize) -> Node {
        self.operate_tags(&RemoveTags(tags.clone()), tags, start, end)
    }

    pub fn toggle_tags(&self, tags: &TagSet, start: usize, end: usize) -> Node {
        self.operate_tags(&ToggleTags(tags.clone()), tags, start, end)
    }

    fn operate_tags(&self, operation: &dyn Operation, tags: &TagSet, start: usize, end: usize) -> Node {
        if tags.is_empty() || start >= end {
            return self.clone();
        }
        self.operate(operation, start, end)
    }

    /// The child index and child-local boundary holding boundary `boundary`,
    /// clamped to the last boundary. `None` for nodes without children.
    pub fn locate_boundary(&self, boundary: usize) -> Option<(usize, usize)> {
        composite::locate_boundary(self.children(), boundary)
    }

    /// Splits into the content before and after boundary `boundary`. Unlike
    /// [`Node::split_at`] the halves may be empty shells of the split child.
    pub fn split_boundary(&self, boundary: usize) -> (Node, Node) {
        match self {
            Node::Leaf(_) | Node::Segment(_) | Node::Gap => self.split_at(boundary),
            _ if self.children().is_empty() => (self.clone(), self.clone()),
            _ => {
                let (left, right) = composite::split_boundary(self.children(), boundary);
                (self.with_children(left), self.with_children(right))
            }
        }
    }

    /// Inserts `text` at boundary `boundary`.
    pub fn write_boundary(&self, boundary: usize, text: &str) -> Node {
        let atoms: Vec<Atom> = text.chars().collect();
        self.write_boundary_atoms(boundary, &atoms)
    }

    pub fn write_boundary_atoms(&self, boundary: usize, atoms: &[Atom]) -> Node {
        match self {
            Node::Leaf(_) | Node::Segment(_) => self.insert_atoms(boundary, atoms),
            Node::Gap => Node::Gap,
            _ => {
                let children = self.seeded_children();
                self.with_children(composite::write_boundary(&children, boundary, atoms))
            }
        }
    }

    /// The atom offset immediately after boundary `boundary`'s preceding
    /// atoms.
    pub fn boundary_to_atom(&self, boundary: usize) -> usize {
        match self {
            Node::Leaf(_) | Node::Segment(_) => boundary.min(self.length()),
            Node::Gap => 0,
            _ => composite::boundary_to_atom(self.children(), boundary),
        }
    }

    /// The boundary an insertion at atom offset `atom` would land on.
    pub fn atom_to_boundary(&self, atom: usize) -> usize {
        match self {
            Node::Leaf(_) | Node::Segment(_) => atom.min(self.length()),
            Node::Gap => 0,
            _ => composite::atom_to_boundary(self.children(), atom),
        }
    }

    pub fn boundary_to_cursor(&self, boundary: usize) -> usize {
        match self {
            Node::Leaf(_) | Node::Segment(_) => boundary.min(self.length()),
            Node::Gap => 0,
            Node::Context(context) if self.is_text_context() => {
                context.text_boundary_to_cursor(boundary)
            }
            _ => composite::boundary_to_cursor(self.children(), boundary),
        }
    }

    /// The first boundary that renders at cursor position `cursor`.
    pub fn cursor_to_boundary_favor_left(&self, cursor: usize) -> usize {
        match self {
            Node::Leaf(_) | Node::Segment(_) => cursor.min(self.length()),
            Node::Gap => 0,
            Node::Context(context) if self.is_text_context() => {
                context.text_cursor_to_boundary(cursor)
            }
            _ => composite::cursor_to_boundary(self.children(), cursor),
        }
    }

    /// The last boundary that renders at cursor position `cursor`: every
    /// boundary from the favor-left one up to (not including) the first
    /// boundary of the next cursor position is equivalent.
    pub fn cursor_to_boundary_favor_right(&self, cursor: usize) -> usize {
        if cursor + 1 < self.total_cursor_positions() {
            self.cursor_to_boundary_favor_left(cursor + 1) - 1
        } else {
            self.boundaries_length() - 1
        }
    }

    pub fn cursor_to_boundary(&self, cursor: usize, favor_left: bool) -> usize {
        if favor_left {
            self.cursor_to_boundary_favor_left(cursor)
        } else {
            self.cursor_to_boundary_favor_right(cursor)
        }
    }

    /// Content equality: the same atoms carrying the same tags, whatever
    /// the tree shape.
    pub fn content_eq(&self, other: &Node) -> bool {
        tagged_atoms(self) == tagged_atoms(other)
    }

    /// Structural equality: the same variants nested the same way, with the
    /// same attributes and content.
    pub fn structure_eq(&self, other: &Node) -> bool {
        self == other
    }

    /// A deep copy rebuilt through the factories, sharing nothing with the
    /// original.
    pub fn copy(&self) -> Node {
        match self {
            Node::Leaf(_) | Node::Segment(_) | Node::Gap => self.clone(),
            _ => self.with_children(
                self.children()
                    .iter()
                    .map(|child| Arc::new(child.copy()))
                    .collect(),
            ),
        }
    }

    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Node::Leaf(leaf) => visitor.visit_leaf(leaf),
            Node::Segment(segment) => visitor.visit_segment(segment),
            Node::Composite(composite) => visitor.visit_composite(composite),
            Node::Context(context) => visitor.visit_context(context),
            Node::Document(document) => visitor.visit_document(document),
            Node::Gap => visitor.visit_gap(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Node> {
        serde_json::from_str(json)
    }
}

impl From<Segment> for Node {
    fn from(segment: Segment) -> Self {
        Node::Segment(segment)
    }
}

impl From<Context> for Node {
    fn from(context: Context) -> Self {
        Node::Context(context)
    }
}

impl From<Document> for Node {
    fn from(document: Document) -> Self {
        Node::Document(document)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

fn map_children(children: &[Arc<Node>], operation: &dyn Operation) -> Vec<Arc<Node>> {
    children
        .iter()
        .map(|child| Arc::new(child.map(operation)))
        .collect()
}

fn tagged_atoms(node: &Node) -> Vec<(Atom, &TagSet)> {
    let mut out = Vec::with_capacity(node.length());
    collect_tagged(node, &mut out);
    out
}

fn collect_tagged<'a>(node: &'a Node, out: &mut Vec<(Atom, &'a TagSet)>) {
    match node {
        Node::Leaf(leaf) => out.extend(leaf.atoms().iter().map(|atom| (*atom, &NO_TAGS))),
        Node::Segment(segment) => {
            out.extend(segment.atoms().iter().map(|atom| (*atom, segment.tags())))
        }
        Node::Gap => {}
        _ => {
            for child in node.children() {
                collect_tagged(child, out);
            }
        }
    }
}

/// Serialises atoms as a plain string rather than an array of characters.
pub(crate) mod atoms_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Atom;

    pub fn serialize<S: Serializer>(atoms: &[Atom], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&atoms.iter().collect::<String>())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Atom>, D::Error> {
        Ok(String::deserialize(deserializer)?.chars().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn tags(labels: &[&str]) -> TagSet {
        labels.iter().copied().collect()
    }

    #[test]
    fn empty_composite_has_one_boundary() {
        let composite = Node::composite(vec![]);
        assert_eq!(composite.length(), 0);
        assert_eq!(composite.boundaries_length(), 1);

        let context = Node::context(BlockTag::Paragraph, vec![]);
        assert_eq!(context.boundaries_length(), 1);
        assert_eq!(context.total_cursor_positions(), 1);
    }

    #[test]
    fn boundaries_sum_over_children() {
        let node = Node::composite(vec![
            Node::leaf("ab"),
            Node::composite(vec![]),
            Node::leaf("cde"),
        ]);
        let summed: usize = node.children().iter().map(|c| c.boundaries_length()).sum();
        assert_eq!(node.boundaries_length(), summed);
        assert_eq!(node.boundaries_length(), 3 + 1 + 4);
        assert_eq!(node.length(), 5);
    }

    #[test]
    fn segment_runs_collapse_cursor_positions() {
        let paragraph = fixture::parse_node("p<'ab' (em)'cd' 'ef'>").unwrap();
        assert_eq!(paragraph.boundaries_length(), 9);
        assert_eq!(paragraph.over_count(), 2);
        assert_eq!(paragraph.total_cursor_positions(), 7);
    }

    #[rstest]
    #[case("composite<'abc' composite<'de' ()'f'> 'gh'>")]
    #[case("p<'Test Content' (em)'x' ''>")]
    #[case("ul<li<p<'Aaa'>> li<p<'Bbb'>>>")]
    fn split_reassembles_at_every_offset(#[case] source: &str) {
        let node = fixture::parse_node(source).unwrap();
        for at in 0..=node.length() {
            let split = node.split(at);
            assert_eq!(split.atoms(), node.atoms(), "split at {at}");
            assert!(split.content_eq(&node), "split at {at}");
            assert_eq!(split.children().len(), node.children().len() + 1);

            let (left, right) = node.split_at(at);
            assert_eq!(left.length(), at);
            assert_eq!(format!("{left}{right}"), node.text());
        }
    }

    #[test]
    fn delete_splits_but_does_not_merge() {
        let node = fixture::parse_node("p<'abcdef'>").unwrap();
        let deleted = node.delete(2, 4);
        assert_eq!(deleted.text(), "abef");
        assert_eq!(fixture::print_node(&deleted), "p<'ab' 'ef'>");
    }

    #[test]
    fn delete_drops_fully_covered_children() {
        let node = fixture::parse_node("composite<'ab' 'cd' 'ef'>").unwrap();
        let deleted = node.delete(1, 5);
        assert_eq!(fixture::print_node(&deleted), "composite<'a' 'f'>");
    }

    #[test]
    fn insert_skips_empty_children() {
        let node = fixture::parse_node("composite<'' 'ab' ''>").unwrap();
        let inserted = node.insert(0, "X");
        assert_eq!(fixture::print_node(&inserted), "composite<'' 'Xab' ''>");
    }

    #[test]
    fn insert_into_empty_context_materialises_a_segment() {
        let context = Node::context(BlockTag::Heading1, vec![]);
        let written = context.insert(0, "Title");
        assert_eq!(fixture::print_node(&written), "h1<'Title'>");
    }

    #[test]
    fn delete_then_insert_restores_content() {
        let node = fixture::parse_node("composite<'abc' (em)'def' 'ghi'>").unwrap();
        let atoms = node.atoms();
        for (start, end) in [(0, 3), (2, 7), (4, 9), (1, 2)] {
            let removed: String = atoms[start..end].iter().collect();
            let restored = node.delete(start, end).insert(start, &removed);
            assert_eq!(restored.atoms(), atoms, "range {start}..{end}");
        }
    }

    #[test]
    fn copy_is_structurally_equal() {
        let node = fixture::parse_node("ul<li<p<'A' (em)'b'>> li<ol<li<'c'>>>>").unwrap();
        assert!(node.copy().structure_eq(&node));
        assert!(Node::Gap.copy().structure_eq(&Node::Gap));
        assert!(Node::leaf("x").copy().structure_eq(&Node::leaf("x")));
    }

    #[test]
    fn content_equality_ignores_shape_but_not_tags() {
        let split = fixture::parse_node("p<'ab' 'c'>").unwrap();
        let whole = fixture::parse_node("p<'abc'>").unwrap();
        let tagged = fixture::parse_node("p<'ab' (em)'c'>").unwrap();

        assert!(split.content_eq(&whole));
        assert!(!split.structure_eq(&whole));
        assert!(!split.content_eq(&tagged));
    }

    #[test]
    fn leaf_and_untagged_segment_have_equal_content() {
        assert!(Node::leaf("ab").content_eq(&Node::segment("ab", TagSet::new())));
        assert!(!Node::leaf("ab").content_eq(&Node::segment("ab", tags(&["em"]))));
    }

    #[test]
    fn boundary_and_atom_addresses_convert() {
        let node = fixture::parse_node("composite<'ab' composite<> 'cd'>").unwrap();
        // boundaries: 'ab' 0..=2, empty 3, 'cd' 4..=6
        assert_eq!(node.boundary_to_atom(3), 2);
        assert_eq!(node.boundary_to_atom(4), 2);
        assert_eq!(node.boundary_to_atom(5), 3);
        assert_eq!(node.atom_to_boundary(2), 2);
        assert_eq!(node.atom_to_boundary(3), 5);
        assert_eq!(node.locate_boundary(3), Some((1, 0)));
        assert_eq!(node.locate_boundary(99), Some((2, 2)));
    }

    #[test]
    fn write_boundary_reaches_empty_children() {
        let node = fixture::parse_node("composite<'ab' composite<> 'cd'>").unwrap();
        let written = node.write_boundary(3, "X");
        assert_eq!(
            fixture::print_node(&written),
            "composite<'ab' composite<'X'> 'cd'>"
        );
    }

    #[rstest]
    #[case("p<'ab' (em)'cd' '' 'ef'>")]
    #[case("composite<'ab' composite<> 'cd'>")]
    #[case("ul<li<p<'Aaa'>> li<p<'B' (em)'bb'>>>")]
    fn cursor_mapping_is_monotone(#[case] source: &str) {
        let node = fixture::parse_node(source).unwrap();
        let total = node.total_cursor_positions();
        let mut previous = (0, 0);
        for cursor in 0..total {
            let left = node.cursor_to_boundary_favor_left(cursor);
            let right = node.cursor_to_boundary_favor_right(cursor);
            assert!(left <= right, "cursor {cursor}");
            assert!(left >= previous.0 && right >= previous.1, "cursor {cursor}");
            assert_eq!(node.boundary_to_cursor(left), cursor);
            assert_eq!(node.boundary_to_cursor(right), cursor);
            previous = (left, right);
        }
        assert_eq!(
            node.cursor_to_boundary_favor_right(total - 1),
            node.boundaries_length() - 1
        );
    }

    #[test]
    fn favor_left_and_right_straddle_segment_seams() {
        let paragraph = fixture::parse_node("p<'ab' '' 'cd'>").unwrap();
        // boundaries 2, 3 and 4 all sit between 'b' and 'c'
        assert_eq!(paragraph.cursor_to_boundary(2, true), 2);
        assert_eq!(paragraph.cursor_to_boundary(2, false), 4);
        assert_eq!(paragraph.cursor_to_boundary(3, true), 5);
    }

    #[test]
    fn cursor_past_the_end_clamps_to_the_last_boundary() {
        let paragraph = fixture::parse_node("p<'ab' 'cd'>").unwrap();
        assert_eq!(paragraph.cursor_to_boundary_favor_left(50), 5);
        assert_eq!(paragraph.cursor_to_boundary_favor_right(50), 5);
    }
}
