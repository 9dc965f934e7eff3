//! The generic composite algebra.
//!
//! Everything here works on a slice of children and returns a new child
//! vector; the owning variant ([`Composite`], [`Context`](crate::Context) or
//! [`Document`](crate::Document)) rebuilds itself around the result through
//! its own factory.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::node::{Atom, Measure, Node};
use crate::operation::Operation;

/// An untyped ordered sequence of child nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawComposite")]
pub struct Composite {
    sub_pieces: Vec<Arc<Node>>,
    #[serde(flatten)]
    measure: Measure,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComposite {
    #[serde(default)]
    sub_pieces: Vec<Arc<Node>>,
}

impl From<RawComposite> for Composite {
    fn from(raw: RawComposite) -> Self {
        Composite::new(raw.sub_pieces)
    }
}

impl Composite {
    pub fn new(sub_pieces: Vec<Arc<Node>>) -> Self {
        let measure = Measure::of(&sub_pieces);
        Composite {
            sub_pieces,
            measure,
        }
    }

    pub fn children(&self) -> &[Arc<Node>] {
        &self.sub_pieces
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }
}

/// Child index and child-local offset for atom offset `at`.
///
/// Empty children never own an atom offset; an offset on the seam between
/// two children belongs to the left one. When every child is empty the first
/// child is chosen.
pub(crate) fn locate_atom(children: &[Arc<Node>], at: usize) -> Option<(usize, usize)> {
    let mut acc = 0;
    let mut last_filled = None;
    for (idx, child) in children.iter().enumerate() {
        let len = child.length();
        if len > 0 {
            if at <= acc + len {
                return Some((idx, at - acc));
            }
            last_filled = Some((idx, len));
        }
        acc += len;
    }
    if children.is_empty() {
        None
    } else {
        Some(last_filled.unwrap_or((0, 0)))
    }
}

/// Child index and child-local boundary for boundary `boundary`.
///
/// Each child claims a contiguous run of `boundaries_length` addresses, so an
/// empty child still claims one. Addresses past the end clamp to the last
/// boundary of the last child.
pub(crate) fn locate_boundary(children: &[Arc<Node>], boundary: usize) -> Option<(usize, usize)> {
    let mut remaining = boundary;
    for (idx, child) in children.iter().enumerate() {
        let count = child.boundaries_length();
        if remaining < count {
            return Some((idx, remaining));
        }
        remaining -= count;
    }
    children
        .last()
        .map(|last| (children.len() - 1, last.boundaries_length() - 1))
}

/// First boundary address of child `idx`.
pub(crate) fn boundary_offset(children: &[Arc<Node>], idx: usize) -> usize {
    children[..idx].iter().map(|c| c.boundaries_length()).sum()
}

fn atom_offset(children: &[Arc<Node>], idx: usize) -> usize {
    children[..idx].iter().map(|c| c.length()).sum()
}

fn joined(
    before: &[Arc<Node>],
    middle: impl IntoIterator<Item = Node>,
    after: &[Arc<Node>],
) -> Vec<Arc<Node>> {
    let mut out = before.to_vec();
    out.extend(middle.into_iter().map(Arc::new));
    out.extend_from_slice(after);
    out
}

pub(crate) fn split_children(children: &[Arc<Node>], at: usize) -> (Vec<Arc<Node>>, Vec<Arc<Node>>) {
    let Some((idx, local)) = locate_atom(children, at) else {
        return (Vec::new(), Vec::new());
    };
    let (left, right) = children[idx].split_at(local);
    (
        joined(&children[..idx], [left], &[]),
        joined(&[], [right], &children[idx + 1..]),
    )
}

pub(crate) fn split(children: &[Arc<Node>], at: usize) -> Vec<Arc<Node>> {
    let Some((idx, local)) = locate_atom(children, at) else {
        return Vec::new();
    };
    let (left, right) = children[idx].split_at(local);
    joined(&children[..idx], [left, right], &children[idx + 1..])
}

pub(crate) fn splice(
    children: &[Arc<Node>],
    start: usize,
    remove: usize,
    inserted: Vec<Arc<Node>>,
) -> Vec<Arc<Node>> {
    let start = start.min(children.len());
    let end = start + remove.min(children.len() - start);
    let mut out = children.to_vec();
    out.splice(start..end, inserted);
    out
}

/// Deletes atoms `start..end` (already clamped, `start < end`).
///
/// A child straddling a bound keeps only its outside halves; children fully
/// inside the range are dropped, as are empty children strictly inside it.
/// Gaps own no atoms and always survive.
pub(crate) fn delete(children: &[Arc<Node>], start: usize, end: usize) -> Vec<Arc<Node>> {
    let mut out = Vec::with_capacity(children.len());
    let mut acc = 0;
    for child in children {
        let from = acc;
        let len = child.length();
        acc += len;

        if child.is_gap() {
            out.push(child.clone());
        } else if len == 0 {
            if !(start < from && from < end) {
                out.push(child.clone());
            }
        } else if from + len <= start || from >= end {
            out.push(child.clone());
        } else if start <= from && from + len <= end {
            continue;
        } else {
            if start > from {
                out.push(Arc::new(child.split_at(start - from).0));
            }
            if end < from + len {
                out.push(Arc::new(child.split_at(end - from).1));
            }
        }
    }
    out
}

/// Inserts into the child owning atom offset `at`; `children` must not be
/// empty.
pub(crate) fn insert(children: &[Arc<Node>], at: usize, atoms: &[Atom]) -> Vec<Arc<Node>> {
    let Some((idx, local)) = locate_atom(children, at) else {
        return children.to_vec();
    };
    let updated = children[idx].insert_atoms(local, atoms);
    joined(&children[..idx], [updated], &children[idx + 1..])
}

pub(crate) fn operate(
    children: &[Arc<Node>],
    operation: &dyn Operation,
    start: usize,
    end: usize,
) -> Vec<Arc<Node>> {
    let mut out = Vec::with_capacity(children.len() + 2);
    let mut acc = 0;
    for child in children {
        let from = acc;
        let len = child.length();
        acc += len;

        if len == 0 || from + len <= start || from >= end {
            out.push(child.clone());
            continue;
        }
        let local_start = start.saturating_sub(from);
        let local_end = (end - from).min(len);
        match child.as_ref() {
            Node::Leaf(_) | Node::Segment(_) => {
                let (before, rest) = child.split_at(local_start);
                let (inside, after) = rest.split_at(local_end - local_start);
                if local_start > 0 {
                    out.push(Arc::new(before));
                }
                out.push(Arc::new(inside.map(operation)));
                if local_end < len {
                    out.push(Arc::new(after));
                }
            }
            _ => out.push(Arc::new(child.operate(operation, local_start, local_end))),
        }
    }
    out
}

pub(crate) fn split_boundary(
    children: &[Arc<Node>],
    boundary: usize,
) -> (Vec<Arc<Node>>, Vec<Arc<Node>>) {
    let Some((idx, local)) = locate_boundary(children, boundary) else {
        return (Vec::new(), Vec::new());
    };
    let (left, right) = children[idx].split_boundary(local);
    (
        joined(&children[..idx], [left], &[]),
        joined(&[], [right], &children[idx + 1..]),
    )
}

pub(crate) fn write_boundary(children: &[Arc<Node>], boundary: usize, atoms: &[Atom]) -> Vec<Arc<Node>> {
    let Some((idx, local)) = locate_boundary(children, boundary) else {
        return children.to_vec();
    };
    let updated = children[idx].write_boundary_atoms(local, atoms);
    joined(&children[..idx], [updated], &children[idx + 1..])
}

pub(crate) fn boundary_to_atom(children: &[Arc<Node>], boundary: usize) -> usize {
    match locate_boundary(children, boundary) {
        Some((idx, local)) => atom_offset(children, idx) + children[idx].boundary_to_atom(local),
        None => 0,
    }
}

pub(crate) fn atom_to_boundary(children: &[Arc<Node>], atom: usize) -> usize {
    match locate_atom(children, atom) {
        Some((idx, local)) => boundary_offset(children, idx) + children[idx].atom_to_boundary(local),
        None => 0,
    }
}

pub(crate) fn boundary_to_cursor(children: &[Arc<Node>], boundary: usize) -> usize {
    match locate_boundary(children, boundary) {
        Some((idx, local)) => {
            let before: usize = children[..idx]
                .iter()
                .map(|c| c.total_cursor_positions())
                .sum();
            before + children[idx].boundary_to_cursor(local)
        }
        None => 0,
    }
}

/// Favor-left cursor lookup for composites whose children are each distinct
/// cursor territory.
pub(crate) fn cursor_to_boundary(children: &[Arc<Node>], cursor: usize) -> usize {
    let mut remaining = cursor;
    let mut before = 0;
    for child in children {
        let positions = child.total_cursor_positions();
        if remaining < positions {
            return before + child.cursor_to_boundary_favor_left(remaining);
        }
        remaining -= positions;
        before += child.boundaries_length();
    }
    before.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(texts: &[&str]) -> Vec<Arc<Node>> {
        texts.iter().map(|t| Arc::new(Node::leaf(t))).collect()
    }

    #[test]
    fn locate_atom_prefers_the_left_child_on_a_seam() {
        let children = leaves(&["ab", "", "cd"]);
        assert_eq!(locate_atom(&children, 2), Some((0, 2)));
        assert_eq!(locate_atom(&children, 3), Some((2, 1)));
        assert_eq!(locate_atom(&children, 0), Some((0, 0)));
    }

    #[test]
    fn locate_atom_falls_back_for_empty_children() {
        assert_eq!(locate_atom(&leaves(&["", ""]), 0), Some((0, 0)));
        assert_eq!(locate_atom(&[], 0), None);
        assert_eq!(locate_atom(&leaves(&["ab", ""]), 7), Some((0, 2)));
    }

    #[test]
    fn each_child_claims_its_own_boundaries() {
        let children = leaves(&["ab", "", "c"]);
        let owners: Vec<_> = (0..6)
            .map(|b| locate_boundary(&children, b).unwrap())
            .collect();
        assert_eq!(
            owners,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (2, 0), (2, 1)]
        );
    }

    #[test]
    fn splice_clamps_its_range() {
        let children = leaves(&["a", "b", "c"]);
        let out = splice(&children, 1, 10, leaves(&["x"]));
        let texts: Vec<_> = out.iter().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["a", "x"]);
    }

    #[test]
    fn delete_keeps_gaps_and_boundary_empties() {
        let mut children = leaves(&["ab", "", "cd", "ef"]);
        children.insert(0, Arc::new(Node::Gap));
        let out = delete(&children, 1, 4);
        let shape: Vec<_> = out
            .iter()
            .map(|c| if c.is_gap() { "|".to_string() } else { c.text() })
            .collect();
        // the empty child at atom 2 sits strictly inside 1..4 and goes
        assert_eq!(shape, vec!["|", "a", "ef"]);
    }

    #[test]
    fn split_boundary_keeps_empty_shells() {
        let children = leaves(&["ab", "cd"]);
        let (left, right) = split_boundary(&children, 3);
        assert_eq!(left.len(), 2);
        assert_eq!(left[1].text(), "");
        assert_eq!(right.len(), 1);
        assert_eq!(right[0].text(), "cd");
    }
}
