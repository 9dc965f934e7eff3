//! The document root and the operation surface editors call.
//!
//! Atom-addressed operations (`insert`, `delete`, case mapping) take
//! character offsets into the document text. Everything an editor drives
//! from a cursor (`write_boundary`, `delete_boundary`, tags, blocks,
//! indentation, line breaks) takes boundary addresses, which callers obtain
//! from cursor positions through [`Document::cursor_to_boundary`] or
//! [`Document::selection`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::composite;
use crate::context::{self, Attributes, Context, into_nodes, map_intersecting};
use crate::error::Result;
use crate::fixture;
use crate::list;
use crate::node::{Atom, Measure, Node};
use crate::operation::{ApplyTags, MapAtoms, Operation, RemoveTags, SetBlock, ToggleTags};
use crate::tag::{BlockTag, Tag, TagSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawDocument")]
pub struct Document {
    sub_pieces: Vec<Arc<Node>>,
    #[serde(flatten)]
    measure: Measure,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    sub_pieces: Vec<Arc<Node>>,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        Document::new(raw.sub_pieces)
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new(Vec::new())
    }
}

/// A pair of boundary addresses, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

impl Document {
    pub fn new(sub_pieces: Vec<Arc<Node>>) -> Self {
        let measure = Measure::of(&sub_pieces);
        Document {
            sub_pieces,
            measure,
        }
    }

    pub fn from_contexts(contexts: Vec<Context>) -> Self {
        Document::new(into_nodes(contexts))
    }

    pub fn from_fixture(source: &str) -> Result<Document> {
        fixture::parse_document(source)
    }

    pub fn to_fixture(&self) -> String {
        fixture::print_node(&self.node())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Document> {
        serde_json::from_str(json)
    }

    pub fn children(&self) -> &[Arc<Node>] {
        &self.sub_pieces
    }

    /// The top-level contexts, in order.
    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.sub_pieces.iter().filter_map(|child| child.as_context())
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn length(&self) -> usize {
        self.measure.length
    }

    pub fn boundaries_length(&self) -> usize {
        self.measure.boundaries_length
    }

    pub fn total_cursor_positions(&self) -> usize {
        self.measure.boundaries_length - self.measure.over_count
    }

    pub fn atoms(&self) -> Vec<Atom> {
        self.node().atoms()
    }

    pub fn text(&self) -> String {
        self.node().text()
    }

    pub fn copy(&self) -> Document {
        Document::from_node(self.node().copy())
    }

    pub fn content_eq(&self, other: &Document) -> bool {
        self.node().content_eq(&other.node())
    }

    pub fn structure_eq(&self, other: &Document) -> bool {
        self == other
    }

    fn node(&self) -> Node {
        Node::Document(self.clone())
    }

    fn from_node(node: Node) -> Document {
        match node {
            Node::Document(document) => document,
            other => Document::new(vec![Arc::new(other)]),
        }
    }

    fn last_boundary(&self) -> usize {
        self.boundaries_length() - 1
    }

    /// Orders and clamps a boundary range to this document.
    fn clamp_range(&self, lb: usize, rb: usize) -> (usize, usize) {
        let last = self.last_boundary();
        (lb.min(rb).min(last), lb.max(rb).min(last))
    }

    /// Children to write into; an empty document gains an empty paragraph.
    fn seeded_children(&self) -> Vec<Arc<Node>> {
        self.node().seeded_children()
    }

    /// Appends `text` at the very end.
    pub fn write(&self, text: &str) -> Document {
        self.write_boundary(self.last_boundary(), text)
    }

    pub fn insert(&self, at: usize, text: &str) -> Document {
        let atoms: Vec<Atom> = text.chars().collect();
        let children = self.seeded_children();
        Document::new(composite::insert(&children, at.min(self.length()), &atoms))
    }

    pub fn write_boundary(&self, boundary: usize, text: &str) -> Document {
        let atoms: Vec<Atom> = text.chars().collect();
        let children = self.seeded_children();
        Document::new(composite::write_boundary(&children, boundary, &atoms))
    }

    /// Deletes atoms `start..end`, merging paragraphs whose separating break
    /// was consumed.
    ///
    /// A delete that starts inside one context and ends inside another joins
    /// the two remainders. A delete covering whole contexts, without
    /// reaching into the contexts on either side, leaves one empty paragraph
    /// in their place.
    pub fn delete(&self, start: usize, end: usize) -> Document {
        let end = end.min(self.length());
        let start = start.min(end);
        if start == end {
            return self.clone();
        }
        let (Some(first), Some(last)) = (
            owner_of_atom(&self.sub_pieces, start),
            owner_of_atom(&self.sub_pieces, end - 1),
        ) else {
            return self.clone();
        };

        let mut bracketed = Vec::with_capacity(self.sub_pieces.len() + 2);
        bracketed.extend_from_slice(&self.sub_pieces[..first]);
        bracketed.push(Arc::new(Node::Gap));
        bracketed.extend_from_slice(&self.sub_pieces[first..=last]);
        bracketed.push(Arc::new(Node::Gap));
        bracketed.extend_from_slice(&self.sub_pieces[last + 1..]);

        let deleted = composite::delete(&bracketed, start, end);
        log::debug!("delete {start}..{end}: merging contexts {first}..={last}");
        Document::new(merge_gapped(deleted))
    }

    /// Deletes everything between boundaries `lb` and `rb` and joins the
    /// two sides across the seam.
    ///
    /// This is backspace and forward delete across structure: two list
    /// items merge, a paragraph after a list joins the last item, and the
    /// first item of a list joins a paragraph before it (dissolving the list
    /// if that was its only item).
    pub fn delete_boundary(&self, lb: usize, rb: usize) -> Document {
        let (lb, rb) = self.clamp_range(lb, rb);
        if lb >= rb {
            return self.clone();
        }
        let (mut left, _) = composite::split_boundary(&self.sub_pieces, lb);
        let (_, right) = composite::split_boundary(&self.sub_pieces, rb);

        let (Some(seam_left), Some((seam_right, rest))) = (left.pop(), right.split_first()) else {
            return self.clone();
        };
        match (seam_left.as_context(), seam_right.as_context()) {
            (Some(a), Some(b)) => {
                log::debug!("joining {} and {} at boundary {lb}", a.block_tag(), b.block_tag());
                left.extend(into_nodes(context::join(a, b)));
            }
            _ => {
                left.push(seam_left.clone());
                left.push(seam_right.clone());
            }
        }
        left.extend_from_slice(rest);
        Document::new(left)
    }

    pub fn apply_tags(&self, tags: &TagSet, lb: usize, rb: usize) -> Document {
        self.operate_tags(&ApplyTags(tags.clone()), tags, lb, rb)
    }

    pub fn remove_tags(&self, tags: &TagSet, lb: usize, rb: usize) -> Document {
        self.operate_tags(&RemoveTags(tags.clone()), tags, lb, rb)
    }

    pub fn toggle_tags(&self, tags: &TagSet, lb: usize, rb: usize) -> Document {
        self.operate_tags(&ToggleTags(tags.clone()), tags, lb, rb)
    }

    fn operate_tags(&self, operation: &dyn Operation, tags: &TagSet, lb: usize, rb: usize) -> Document {
        if tags.is_empty() || lb >= rb {
            return self.clone();
        }
        let start = self.boundary_to_atom(lb);
        let end = self.boundary_to_atom(rb);
        self.operate(operation, start, end)
    }

    /// Applies `operation` to atoms `start..end`.
    pub fn operate(&self, operation: &dyn Operation, start: usize, end: usize) -> Document {
        Document::from_node(self.node().operate(operation, start, end))
    }

    pub fn upper_case(&self, start: usize, end: usize) -> Document {
        self.operate(&MapAtoms::upper_case(), start, end)
    }

    pub fn lower_case(&self, start: usize, end: usize) -> Document {
        self.operate(&MapAtoms::lower_case(), start, end)
    }

    /// Retags the text contexts intersecting boundaries `lb..=rb`.
    ///
    /// `ul`, `ol` and `li` make those contexts items of one new list per
    /// run (or switch the kind of a list already there); any other tag
    /// takes list items in the range out of their lists.
    pub fn update_blocks(&self, block_tag: BlockTag, lb: usize, rb: usize) -> Document {
        let (lb, rb) = self.clamp_range(lb, rb);
        Document::from_contexts(list::retag(&self.sub_pieces, SetBlock(block_tag), lb, rb))
    }

    /// [`Document::update_blocks`] for a tag given by name; unknown names
    /// leave the document unchanged.
    pub fn update_blocks_named(&self, name: &str, lb: usize, rb: usize) -> Document {
        match name.parse::<BlockTag>() {
            Ok(block_tag) => self.update_blocks(block_tag, lb, rb),
            Err(err) => {
                log::debug!("ignoring block update: {err}");
                self.clone()
            }
        }
    }

    pub fn update_attributes(&self, attributes: &Attributes, lb: usize, rb: usize) -> Document {
        let retagged = match attributes.block {
            Some(block_tag) => self.update_blocks(block_tag, lb, rb),
            None => self.clone(),
        };
        retagged.indent(attributes.indent_delta, lb, rb)
    }

    /// Indents (positive `amount`) or outdents the contexts intersecting
    /// boundaries `lb..=rb`, one level at a time. List items are re-nested,
    /// other contexts change their indentation level.
    pub fn indent(&self, amount: isize, lb: usize, rb: usize) -> Document {
        let delta = amount.signum();
        let (lb, rb) = self.clamp_range(lb, rb);
        let mut document = self.clone();
        for _ in 0..amount.unsigned_abs() {
            document = Document::new(map_intersecting(
                &document.sub_pieces,
                lb,
                rb,
                |context, lb, rb| list::indent_range(context, delta, lb, rb),
            ));
        }
        document
    }

    /// "Enter" at boundary `boundary`; see [`Context::context_break_at`].
    pub fn context_break_at(&self, boundary: usize) -> Document {
        let children = self.seeded_children();
        let Some((idx, local)) = composite::locate_boundary(&children, boundary) else {
            return self.clone();
        };
        let Some(target) = children[idx].as_context() else {
            return self.clone();
        };
        let broken = target.context_break_at(local);
        Document::new(composite::splice(&children, idx, 1, into_nodes(broken)))
    }

    /// "Enter" at atom offset `at`.
    pub fn context_split(&self, at: usize) -> Document {
        self.context_break_at(self.atom_to_boundary(at))
    }

    /// Replaces the selection `lb..rb` with a line break.
    pub fn new_line(&self, lb: usize, rb: usize) -> Document {
        let (lb, rb) = self.clamp_range(lb, rb);
        self.delete_boundary(lb, rb).context_break_at(lb)
    }

    /// Indents the selection by one level.
    ///
    /// A selection that merely touches a context, by starting on its last
    /// boundary or ending on its first, does not indent that context.
    pub fn enter_tab(&self, lb: usize, rb: usize) -> Document {
        let (lb, rb) = self.trim_straddle(lb, rb);
        self.indent(1, lb, rb)
    }

    pub fn exit_tab(&self, lb: usize, rb: usize) -> Document {
        let (lb, rb) = self.trim_straddle(lb, rb);
        self.indent(-1, lb, rb)
    }

    fn trim_straddle(&self, lb: usize, rb: usize) -> (usize, usize) {
        let (mut lb, mut rb) = self.clamp_range(lb, rb);
        if lb == rb {
            return (lb, rb);
        }
        if let Some((_, end)) = text_span(&self.sub_pieces, lb)
            && lb == end
            && end < self.last_boundary()
        {
            lb += 1;
        }
        if let Some((start, _)) = text_span(&self.sub_pieces, rb)
            && rb == start
            && rb > 0
        {
            rb -= 1;
        }
        (lb, rb.max(lb))
    }

    pub fn boundary_to_atom(&self, boundary: usize) -> usize {
        composite::boundary_to_atom(&self.sub_pieces, boundary)
    }

    pub fn atom_to_boundary(&self, at: usize) -> usize {
        composite::atom_to_boundary(&self.sub_pieces, at)
    }

    pub fn boundary_to_cursor(&self, boundary: usize) -> usize {
        composite::boundary_to_cursor(&self.sub_pieces, boundary)
    }

    pub fn cursor_to_boundary(&self, cursor: usize, favor_left: bool) -> usize {
        self.node().cursor_to_boundary(cursor, favor_left)
    }

    pub fn cursor_to_boundary_favor_left(&self, cursor: usize) -> usize {
        self.node().cursor_to_boundary_favor_left(cursor)
    }

    pub fn cursor_to_boundary_favor_right(&self, cursor: usize) -> usize {
        self.node().cursor_to_boundary_favor_right(cursor)
    }

    /// Boundaries for a selection between two cursor positions.
    ///
    /// A collapsed selection resolves to the leftmost equivalent boundary;
    /// an extended one takes the rightmost boundary at its start and the
    /// leftmost at its end, so it encloses exactly the selected atoms.
    pub fn selection(&self, start_cursor: usize, end_cursor: usize) -> Selection {
        let (start_cursor, end_cursor) = (
            start_cursor.min(end_cursor),
            start_cursor.max(end_cursor),
        );
        if start_cursor == end_cursor {
            let boundary = self.cursor_to_boundary_favor_left(start_cursor);
            return Selection {
                start: boundary,
                end: boundary,
            };
        }
        Selection {
            start: self.cursor_to_boundary_favor_right(start_cursor),
            end: self.cursor_to_boundary_favor_left(end_cursor),
        }
    }

    /// Whether any selected text carries `tag`. A collapsed selection looks
    /// at the segment the cursor sits in.
    pub fn selection_has_tag(&self, tag: &Tag, selection: Selection) -> bool {
        self.selected_tag_sets(selection)
            .iter()
            .any(|tags| tags.contains(tag))
    }

    /// Whether all selected text carries `tag`.
    pub fn selection_entirely_has_tag(&self, tag: &Tag, selection: Selection) -> bool {
        let tag_sets = self.selected_tag_sets(selection);
        !tag_sets.is_empty() && tag_sets.iter().all(|tags| tags.contains(tag))
    }

    fn selected_tag_sets(&self, selection: Selection) -> Vec<&TagSet> {
        if selection.is_collapsed() {
            return segment_at_boundary(&self.sub_pieces, selection.start)
                .map(|tags| vec![tags])
                .unwrap_or_default();
        }
        let start = self.boundary_to_atom(selection.start);
        let end = self.boundary_to_atom(selection.end);
        let mut out = Vec::new();
        collect_tag_sets(&self.sub_pieces, start, end, &mut out);
        out
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Index of the child holding the character at atom index `at`.
fn owner_of_atom(children: &[Arc<Node>], at: usize) -> Option<usize> {
    let mut acc = 0;
    let mut last_filled = None;
    for (idx, child) in children.iter().enumerate() {
        let len = child.length();
        if len > 0 {
            if at < acc + len {
                return Some(idx);
            }
            last_filled = Some(idx);
        }
        acc += len;
    }
    last_filled
}

/// Resolves the two gaps left by [`Document::delete`].
///
/// Between the gaps, adjacent contexts (whose break the delete consumed)
/// are joined, and two gaps meeting (every context between them deleted)
/// become one empty paragraph. Gaps next to a surviving context vanish.
fn merge_gapped(children: Vec<Arc<Node>>) -> Vec<Arc<Node>> {
    let (Some(open), Some(close)) = (
        children.iter().position(|child| child.is_gap()),
        children.iter().rposition(|child| child.is_gap()),
    ) else {
        return children;
    };

    let mut window: Vec<Arc<Node>> = Vec::with_capacity(close + 1 - open);
    for child in &children[open..=close] {
        let Some(previous) = window.last().cloned() else {
            window.push(child.clone());
            continue;
        };
        match (previous.as_ref(), child.as_ref()) {
            (Node::Gap, Node::Gap) => {
                window.pop();
                window.push(Arc::new(Node::Context(Context::empty(BlockTag::Paragraph))));
            }
            (Node::Context(left), Node::Context(right)) => {
                window.pop();
                window.extend(into_nodes(context::join(left, right)));
            }
            _ => window.push(child.clone()),
        }
    }
    window.retain(|child| !child.is_gap());

    let mut out = children[..open].to_vec();
    out.extend(window);
    out.extend_from_slice(&children[close + 1..]);
    out
}

/// Inclusive boundary span of the innermost text context holding
/// `boundary`.
fn text_span(children: &[Arc<Node>], boundary: usize) -> Option<(usize, usize)> {
    let (idx, local) = composite::locate_boundary(children, boundary)?;
    let start = composite::boundary_offset(children, idx);
    let context = children[idx].as_context()?;
    if context.is_text() {
        return Some((start, start + context.boundaries_length() - 1));
    }
    text_span(context.children(), local).map(|(s, e)| (start + s, start + e))
}

fn segment_at_boundary(children: &[Arc<Node>], boundary: usize) -> Option<&TagSet> {
    let (idx, local) = composite::locate_boundary(children, boundary)?;
    let child = children[idx].as_ref();
    match child {
        Node::Segment(segment) => Some(segment.tags()),
        _ => segment_at_boundary(child.children(), local),
    }
}

fn collect_tag_sets<'a>(children: &'a [Arc<Node>], start: usize, end: usize, out: &mut Vec<&'a TagSet>) {
    let mut acc = 0;
    for child in children {
        let from = acc;
        let len = child.length();
        acc += len;
        if len == 0 || from + len <= start || from >= end {
            continue;
        }
        match child.as_ref() {
            Node::Segment(segment) => out.push(segment.tags()),
            _ => collect_tag_sets(
                child.children(),
                start.saturating_sub(from),
                end - from,
                out,
            ),
        }
    }
}
