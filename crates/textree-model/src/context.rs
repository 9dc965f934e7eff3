//! Block-level nodes.
//!
//! A [`Context`] carries a [`BlockTag`] and an indentation level. Its
//! children are either all segments (a text context) or all contexts (a
//! heterogeneous context, used for lists and list items). The factory
//! [`Context::new`] decides which by looking at the children once; mixed
//! input is normalised by wrapping each run of segments in a paragraph.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::composite;
use crate::leaf::Segment;
use crate::node::{Measure, Node};
use crate::tag::BlockTag;

/// Whether a context holds text or further block structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextKind {
    /// Every child is a [`Segment`].
    #[default]
    Homogeneous,
    /// Every child is a [`Context`].
    Heterogeneous,
}

/// A block attribute rewrite: an optional new block tag and an indentation
/// change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes {
    pub block: Option<BlockTag>,
    pub indent_delta: isize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawContext")]
pub struct Context {
    block_tag: BlockTag,
    indentation_amount: usize,
    kind: ContextKind,
    sub_pieces: Vec<Arc<Node>>,
    #[serde(flatten)]
    measure: Measure,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContext {
    #[serde(default)]
    block_tag: BlockTag,
    #[serde(default)]
    indentation_amount: usize,
    #[serde(default)]
    sub_pieces: Vec<Arc<Node>>,
}

impl From<RawContext> for Context {
    fn from(raw: RawContext) -> Self {
        Context::new(raw.block_tag, raw.indentation_amount, raw.sub_pieces)
    }
}

/// Result of breaking a context at a boundary.
enum Break {
    Split(Context, Context),
    /// The break happened inside and a list container took both halves.
    Absorbed(Context),
}

impl Context {
    pub fn new(block_tag: BlockTag, indentation_amount: usize, children: Vec<Arc<Node>>) -> Self {
        let (kind, sub_pieces) = classify(children);
        let mut measure = Measure::of(&sub_pieces);
        if kind == ContextKind::Homogeneous && !sub_pieces.is_empty() {
            measure.over_count += sub_pieces.len() - 1;
        }
        Context {
            block_tag,
            indentation_amount,
            kind,
            sub_pieces,
            measure,
        }
    }

    pub fn empty(block_tag: BlockTag) -> Self {
        Context::new(block_tag, 0, Vec::new())
    }

    pub fn paragraph(text: &str) -> Self {
        Context::new(
            BlockTag::Paragraph,
            0,
            vec![Arc::new(Node::Segment(Segment::untagged(text)))],
        )
    }

    pub fn block_tag(&self) -> BlockTag {
        self.block_tag
    }

    pub fn indentation(&self) -> usize {
        self.indentation_amount
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn is_text(&self) -> bool {
        self.kind == ContextKind::Homogeneous
    }

    pub fn is_heterogeneous(&self) -> bool {
        self.kind == ContextKind::Heterogeneous
    }

    pub fn children(&self) -> &[Arc<Node>] {
        &self.sub_pieces
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

    pub fn with_children(&self, children: Vec<Arc<Node>>) -> Context {
        Context::new(self.block_tag, self.indentation_amount, children)
    }

    pub fn update_block(&self, block_tag: BlockTag) -> Context {
        Context::new(block_tag, self.indentation_amount, self.sub_pieces.clone())
    }

    /// Like [`Context::update_block`] for a tag given by name. Names outside
    /// the block vocabulary leave the context unchanged.
    pub fn update_block_named(&self, name: &str) -> Context {
        match name.parse::<BlockTag>() {
            Ok(block_tag) => self.update_block(block_tag),
            Err(err) => {
                log::debug!("ignoring block tag assignment: {err}");
                self.clone()
            }
        }
    }

    /// Indentation change, clamped at zero.
    pub fn indent(&self, delta: isize) -> Context {
        let indentation = self.indentation_amount.saturating_add_signed(delta);
        Context::new(self.block_tag, indentation, self.sub_pieces.clone())
    }

    pub fn update_attributes(&self, attributes: &Attributes) -> Context {
        let indentation = self
            .indentation_amount
            .saturating_add_signed(attributes.indent_delta);
        Context::new(
            attributes.block.unwrap_or(self.block_tag),
            indentation,
            self.sub_pieces.clone(),
        )
    }

    /// "Enter" at atom offset `at`. See [`Context::context_break_at`].
    pub fn context_split(&self, at: usize) -> Vec<Context> {
        let boundary = Node::Context(self.clone()).atom_to_boundary(at);
        self.context_break_at(boundary)
    }

    /// "Enter" at boundary `boundary`.
    ///
    /// A text context splits in two and the right half becomes a plain
    /// paragraph, so breaking a heading gives a heading and a paragraph.
    /// A heterogeneous context breaks its innermost text context and re-wraps
    /// both halves at every enclosing level until a list container takes them
    /// as sibling items.
    pub fn context_break_at(&self, boundary: usize) -> Vec<Context> {
        match self.break_at(boundary) {
            Break::Split(left, right) => vec![left, right],
            Break::Absorbed(context) => vec![context],
        }
    }

    fn break_at(&self, boundary: usize) -> Break {
        if self.is_text() {
            let (left, right) = composite::split_boundary(&self.sub_pieces, boundary);
            let right_tag = if self.block_tag == BlockTag::ListItem {
                BlockTag::ListItem
            } else {
                BlockTag::Paragraph
            };
            return Break::Split(
                self.with_children(left),
                Context::new(right_tag, self.indentation_amount, right),
            );
        }

        let Some((idx, local)) = composite::locate_boundary(&self.sub_pieces, boundary) else {
            return Break::Absorbed(self.clone());
        };
        let Some(child) = self.sub_pieces[idx].as_context() else {
            return Break::Absorbed(self.clone());
        };
        let before = &self.sub_pieces[..idx];
        let after = &self.sub_pieces[idx + 1..];
        match child.break_at(local) {
            Break::Absorbed(inner) => {
                Break::Absorbed(self.with_children(concat(before, vec![inner], after)))
            }
            Break::Split(left, right) if self.block_tag.is_list() => {
                Break::Absorbed(self.with_children(concat(before, vec![left, right], after)))
            }
            Break::Split(left, right) => Break::Split(
                self.with_children(concat(before, vec![left], &[])),
                self.with_children(concat(&[], vec![right], after)),
            ),
        }
    }

    pub(crate) fn text_boundary_to_cursor(&self, boundary: usize) -> usize {
        match composite::locate_boundary(&self.sub_pieces, boundary) {
            Some((idx, local)) => {
                let before: usize = self.sub_pieces[..idx].iter().map(|c| c.length()).sum();
                before + local
            }
            None => 0,
        }
    }

    /// Inside a run of segments a cursor position is an atom offset; the
    /// leftmost boundary for it is the end of the earliest segment reaching
    /// that offset.
    pub(crate) fn text_cursor_to_boundary(&self, cursor: usize) -> usize {
        let mut acc = 0;
        let mut before = 0;
        for child in &self.sub_pieces {
            let len = child.length();
            if cursor <= acc + len {
                return before + (cursor - acc);
            }
            acc += len;
            before += child.boundaries_length();
        }
        before.saturating_sub(1)
    }
}

fn classify(children: Vec<Arc<Node>>) -> (ContextKind, Vec<Arc<Node>>) {
    let mut flat = Vec::with_capacity(children.len());
    flatten_into(children, &mut flat);

    if !flat.iter().any(|child| child.is_context()) {
        return (ContextKind::Homogeneous, flat);
    }

    let mut out = Vec::with_capacity(flat.len());
    let mut run = Vec::new();
    for child in flat {
        if child.is_context() {
            if !run.is_empty() {
                out.push(wrap_run(std::mem::take(&mut run)));
            }
            out.push(child);
        } else {
            run.push(child);
        }
    }
    if !run.is_empty() {
        out.push(wrap_run(run));
    }
    (ContextKind::Heterogeneous, out)
}

fn wrap_run(run: Vec<Arc<Node>>) -> Arc<Node> {
    Arc::new(Node::Context(Context::new(BlockTag::Paragraph, 0, run)))
}

/// Leaves become untagged segments, untyped composites are inlined, gaps
/// are dropped.
fn flatten_into(children: Vec<Arc<Node>>, out: &mut Vec<Arc<Node>>) {
    for child in children {
        match child.as_ref() {
            Node::Leaf(leaf) => out.push(Arc::new(Node::Segment(Segment::from(leaf.clone())))),
            Node::Composite(_) | Node::Document(_) => flatten_into(child.children().to_vec(), out),
            Node::Gap => {}
            Node::Segment(_) | Node::Context(_) => out.push(child),
        }
    }
}

pub(crate) fn concat(
    before: &[Arc<Node>],
    middle: Vec<Context>,
    after: &[Arc<Node>],
) -> Vec<Arc<Node>> {
    let mut out = before.to_vec();
    out.extend(into_nodes(middle));
    out.extend_from_slice(after);
    out
}

pub(crate) fn into_nodes(contexts: Vec<Context>) -> Vec<Arc<Node>> {
    contexts
        .into_iter()
        .map(|context| Arc::new(Node::Context(context)))
        .collect()
}

pub(crate) fn contexts_of(children: &[Arc<Node>]) -> Vec<Context> {
    children
        .iter()
        .filter_map(|child| child.as_context().cloned())
        .collect()
}

/// Replaces each context child whose boundary range intersects `lb..=rb`
/// with the result of `f`, which receives the range clipped to the child's
/// own boundary addresses.
pub(crate) fn map_intersecting<F>(
    children: &[Arc<Node>],
    lb: usize,
    rb: usize,
    mut f: F,
) -> Vec<Arc<Node>>
where
    F: FnMut(&Context, usize, usize) -> Vec<Context>,
{
    let mut out = Vec::with_capacity(children.len());
    let mut start = 0;
    for child in children {
        let end = start + child.boundaries_length() - 1;
        match child.as_context() {
            Some(context) if start <= rb && lb <= end => {
                let local_lb = lb.max(start) - start;
                let local_rb = rb.min(end) - start;
                out.extend(into_nodes(f(context, local_lb, local_rb)));
            }
            _ => out.push(child.clone()),
        }
        start = end + 1;
    }
    out
}

/// Joins two adjacent contexts across the seam between them, as when the
/// break separating them is deleted.
///
/// - two text contexts concatenate their segments (welding the seam);
/// - a heterogeneous left side joins its last child with the right side;
/// - two heterogeneous sides join their facing children and the rest of
///   the right side moves into the left;
/// - a text left side takes the first text context out of a heterogeneous
///   right side, and whatever remains of the right side follows. A list
///   emptied this way dissolves.
///
/// The left side's block tag and indentation win.
pub(crate) fn join(left: &Context, right: &Context) -> Vec<Context> {
    match (left.is_text(), right.is_text()) {
        (true, true) => {
            vec![left.with_children(weld(&left.sub_pieces, &right.sub_pieces))]
        }
        (false, true) => {
            let Some((last, init)) = split_last_context(left) else {
                return vec![left.clone(), right.clone()];
            };
            vec![left.with_children(concat(init, join(&last, right), &[]))]
        }
        (false, false) => {
            let (Some((last, init)), Some((first, rest))) =
                (split_last_context(left), split_first_context(right))
            else {
                return vec![left.clone(), right.clone()];
            };
            vec![left.with_children(concat(init, join(&last, &first), rest))]
        }
        (true, false) => {
            let (first, remainder) = take_first_text(right);
            let mut out = join(left, &first);
            out.extend(remainder);
            out
        }
    }
}

fn split_last_context(context: &Context) -> Option<(Context, &[Arc<Node>])> {
    let (last, init) = context.sub_pieces.split_last()?;
    Some((last.as_context()?.clone(), init))
}

fn split_first_context(context: &Context) -> Option<(Context, &[Arc<Node>])> {
    let (first, rest) = context.sub_pieces.split_first()?;
    Some((first.as_context()?.clone(), rest))
}

/// Removes the first text context from `context`, returning it and what is
/// left (`None` when nothing is left).
fn take_first_text(context: &Context) -> (Context, Option<Context>) {
    if context.is_text() {
        return (context.clone(), None);
    }
    let Some((first, rest)) = split_first_context(context) else {
        return (Context::empty(BlockTag::Paragraph), Some(context.clone()));
    };
    let (text, remainder) = take_first_text(&first);
    let mut children = into_nodes(remainder.into_iter().collect());
    children.extend_from_slice(rest);
    if children.is_empty() {
        log::debug!("{} emptied by join, dissolving it", context.block_tag);
        (text, None)
    } else {
        (text, Some(context.with_children(children)))
    }
}

/// Concatenates two segment runs. Empty segments at the seam are dropped in
/// favour of the other side, and two segments with identical tags meeting at
/// the seam become one.
fn weld(left: &[Arc<Node>], right: &[Arc<Node>]) -> Vec<Arc<Node>> {
    let mut out = left.to_vec();
    let mut rest = right;
    if let (Some(last), Some((first, tail))) = (out.last().cloned(), right.split_first()) {
        if first.length() == 0 {
            rest = tail;
        } else if last.length() == 0 {
            out.pop();
        } else if let (Some(a), Some(b)) = (last.as_segment(), first.as_segment())
            && a.tags() == b.tags()
        {
            out.pop();
            out.push(Arc::new(Node::Segment(a.append(b))));
            rest = tail;
        }
    }
    out.extend_from_slice(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use pretty_assertions::assert_eq;

    fn context(source: &str) -> Context {
        fixture::parse_node(source)
            .unwrap()
            .as_context()
            .cloned()
            .unwrap()
    }

    fn print(contexts: &[Context]) -> String {
        contexts
            .iter()
            .map(|c| fixture::print_node(&Node::Context(c.clone())))
            .collect()
    }

    #[test]
    fn factory_classifies_children() {
        assert_eq!(context("p<'a' (em)'b'>").kind(), ContextKind::Homogeneous);
        assert_eq!(context("ul<li<p<'a'>>>").kind(), ContextKind::Heterogeneous);
        assert_eq!(context("li<>").kind(), ContextKind::Homogeneous);
    }

    #[test]
    fn mixed_children_are_promoted_with_paragraph_wrappers() {
        let mixed = Context::new(
            BlockTag::ListItem,
            0,
            vec![
                Arc::new(Node::segment("lead", Default::default())),
                Arc::new(Node::Context(context("ul<li<'x'>>"))),
            ],
        );
        assert!(mixed.is_heterogeneous());
        assert_eq!(print(&[mixed]), "li<p<'lead'>ul<li<'x'>>>");
    }

    #[test]
    fn leaves_become_segments() {
        let built = Context::new(BlockTag::Paragraph, 0, vec![Arc::new(Node::leaf("x"))]);
        assert!(built.children()[0].as_segment().is_some());
    }

    #[test]
    fn unknown_block_names_are_ignored() {
        let heading = context("h1<'Title'>");
        assert_eq!(heading.update_block_named("marquee"), heading);
        assert_eq!(
            heading.update_block_named("H2").block_tag(),
            BlockTag::Heading2
        );
    }

    #[test]
    fn indentation_clamps_at_zero() {
        let paragraph = context("p<'x'>");
        assert_eq!(paragraph.indent(2).indentation(), 2);
        assert_eq!(paragraph.indent(2).indent(-5).indentation(), 0);
        let attributes = Attributes {
            block: Some(BlockTag::Heading3),
            indent_delta: 1,
        };
        let updated = paragraph.update_attributes(&attributes);
        assert_eq!(updated.block_tag(), BlockTag::Heading3);
        assert_eq!(updated.indentation(), 1);
    }

    #[test]
    fn breaking_a_heading_gives_heading_then_paragraph() {
        let heading = context("h2<'Title'>");
        assert_eq!(
            print(&heading.context_break_at(2)),
            "h2<'Ti'>p<'tle'>"
        );
        assert_eq!(print(&heading.context_split(5)), "h2<'Title'>p<''>");
    }

    #[test]
    fn breaking_inside_a_list_adds_a_sibling_item() {
        let list = context("ul<li<p<'Aaa'>> li<p<'Bbb'>>>");
        // boundary 6 is between "Bb" and "b"
        assert_eq!(
            print(&list.context_break_at(6)),
            "ul<li<p<'Aaa'>>li<p<'Bb'>>li<p<'b'>>>"
        );
    }

    #[test]
    fn breaking_a_nested_item_stays_in_the_nested_list() {
        let list = context("ul<li<p<'A'> ol<li<p<'xy'>>>>>");
        // boundaries: 'A' 0..=1, 'xy' 2..=4
        assert_eq!(
            print(&list.context_break_at(3)),
            "ul<li<p<'A'>ol<li<p<'x'>>li<p<'y'>>>>>"
        );
    }

    #[test]
    fn blockquotes_rewrap_both_halves() {
        let quote = context("blockquote<p<'ab'>>");
        assert_eq!(
            print(&quote.context_break_at(1)),
            "blockquote<p<'a'>>blockquote<p<'b'>>"
        );
    }

    #[test]
    fn joining_text_contexts_welds_equal_tags() {
        let joined = join(&context("h1<'ab' (em)'c'>"), &context("p<(em)'d' 'e'>"));
        assert_eq!(print(&joined), "h1<'ab' (em)'cd' 'e'>");
    }

    #[test]
    fn joining_drops_empty_seam_segments() {
        let joined = join(&context("p<''>"), &context("h2<(em)'x'>"));
        assert_eq!(print(&joined), "p<(em)'x'>");
    }

    #[test]
    fn joining_text_into_a_list_takes_its_first_item() {
        let joined = join(&context("p<'X'>"), &context("ul<li<p<'A'>> li<p<'B'>>>"));
        assert_eq!(print(&joined), "p<'XA'>ul<li<p<'B'>>>");
    }

    #[test]
    fn joining_the_last_item_away_dissolves_the_list() {
        let joined = join(&context("p<'X'>"), &context("ul<li<p<'A'>>>"));
        assert_eq!(print(&joined), "p<'XA'>");
    }

    #[test]
    fn joining_a_list_with_text_extends_its_last_item() {
        let joined = join(&context("ul<li<p<'A'>> li<p<'B'>>>"), &context("p<'C'>"));
        assert_eq!(print(&joined), "ul<li<p<'A'>>li<p<'BC'>>>");
    }
}
