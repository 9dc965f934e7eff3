//! Range transforms applied by [`Node::map`](crate::Node::map) and
//! [`Node::operate`](crate::Node::operate).
//!
//! An operation rewrites the leaves it reaches. A context may also answer
//! the operation itself by returning `Some` from [`Operation::context`],
//! which stops the walk from descending into its children.

use crate::context::Context;
use crate::leaf::{Leaf, Segment};
use crate::node::Atom;
use crate::tag::{BlockTag, TagSet};

pub trait Operation {
    fn leaf(&self, leaf: &Leaf) -> Leaf {
        leaf.clone()
    }

    fn segment(&self, segment: &Segment) -> Segment {
        segment.clone()
    }

    /// `Some` replaces the whole context and ends recursion; `None` lets the
    /// operation reach the context's children.
    fn context(&self, _context: &Context) -> Option<Context> {
        None
    }
}

/// Adds tags to every segment reached.
#[derive(Debug, Clone)]
pub struct ApplyTags(pub TagSet);

impl Operation for ApplyTags {
    fn segment(&self, segment: &Segment) -> Segment {
        segment.with_tags(segment.tags().union(&self.0))
    }
}

#[derive(Debug, Clone)]
pub struct RemoveTags(pub TagSet);

impl Operation for RemoveTags {
    fn segment(&self, segment: &Segment) -> Segment {
        segment.with_tags(segment.tags().difference(&self.0))
    }
}

/// Flips each tag per segment: present tags are removed, absent ones added.
#[derive(Debug, Clone)]
pub struct ToggleTags(pub TagSet);

impl Operation for ToggleTags {
    fn segment(&self, segment: &Segment) -> Segment {
        segment.with_tags(segment.tags().symmetric_difference(&self.0))
    }
}

/// Rewrites atoms one for one, leaving tags and structure alone.
#[derive(Debug, Clone, Copy)]
pub struct MapAtoms(pub fn(Atom) -> Atom);

impl MapAtoms {
    pub fn upper_case() -> Self {
        MapAtoms(|atom| single(atom.to_uppercase(), atom))
    }

    pub fn lower_case() -> Self {
        MapAtoms(|atom| single(atom.to_lowercase(), atom))
    }

    fn apply(&self, atoms: &[Atom]) -> Vec<Atom> {
        atoms.iter().map(|atom| (self.0)(*atom)).collect()
    }
}

/// Case mappings that expand to several characters (`ß` to `SS`) would
/// change the atom count, so those atoms are kept as they are.
fn single(mut mapped: impl Iterator<Item = Atom>, original: Atom) -> Atom {
    match (mapped.next(), mapped.next()) {
        (Some(atom), None) => atom,
        _ => original,
    }
}

impl Operation for MapAtoms {
    fn leaf(&self, leaf: &Leaf) -> Leaf {
        Leaf::from_atoms(self.apply(leaf.atoms()))
    }

    fn segment(&self, segment: &Segment) -> Segment {
        segment.with_atoms(self.apply(segment.atoms()))
    }
}

/// Retags every context reached, without descending into it.
///
/// [`Document::update_blocks`](crate::Document::update_blocks) uses it for
/// the text contexts in its range, restructuring lists around them.
#[derive(Debug, Clone, Copy)]
pub struct SetBlock(pub BlockTag);

impl SetBlock {
    pub fn block_tag(&self) -> BlockTag {
        self.0
    }

    pub fn retag(&self, context: &Context) -> Context {
        context.update_block(self.0)
    }
}

impl Operation for SetBlock {
    fn context(&self, context: &Context) -> Option<Context> {
        Some(self.retag(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{parse_node, print_node};
    use pretty_assertions::assert_eq;

    fn tags(labels: &[&str]) -> TagSet {
        labels.iter().copied().collect()
    }

    #[test]
    fn tag_operations_only_touch_the_range() {
        let paragraph = parse_node("p<'abcdef'>").unwrap();
        let applied = paragraph.operate(&ApplyTags(tags(&["em"])), 2, 4);
        assert_eq!(print_node(&applied), "p<'ab' (em)'cd' 'ef'>");

        let removed = applied.operate(&RemoveTags(tags(&["em"])), 0, 6);
        assert_eq!(print_node(&removed), "p<'ab' 'cd' 'ef'>");
        assert!(removed.content_eq(&paragraph));
    }

    #[test]
    fn toggling_twice_restores_content() {
        let paragraph = parse_node("p<'ab' (em)'cd' (strong)'ef'>").unwrap();
        let toggle = ToggleTags(tags(&["em"]));
        let once = paragraph.operate(&toggle, 1, 5);
        assert_eq!(
            print_node(&once),
            "p<'a' (em)'b' 'cd' (em, strong)'e' (strong)'f'>"
        );
        assert!(once.operate(&toggle, 1, 5).content_eq(&paragraph));
    }

    #[test]
    fn case_mapping_keeps_atom_count() {
        let leaf = parse_node("'straße'").unwrap();
        let upper = leaf.map(&MapAtoms::upper_case());
        assert_eq!(upper.text(), "STRAßE");
        assert_eq!(upper.length(), leaf.length());
    }

    #[test]
    fn set_block_stops_at_the_first_context() {
        let list = parse_node("ul<li<p<'a'>>>").unwrap();
        let retagged = list.map(&SetBlock(BlockTag::OrderedList));
        assert_eq!(print_node(&retagged), "ol<li<p<'a'>>>");
    }
}
