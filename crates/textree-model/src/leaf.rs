//! Text-bearing leaves: the plain [`Leaf`] and the tagged [`Segment`].

use serde::{Deserialize, Serialize};

use crate::node::{Atom, atoms_serde};
use crate::tag::TagSet;

/// An ordered run of atoms with no children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaf {
    #[serde(with = "atoms_serde")]
    characters: Vec<Atom>,
}

impl Leaf {
    pub fn new(text: &str) -> Self {
        Leaf {
            characters: text.chars().collect(),
        }
    }

    pub fn from_atoms(characters: Vec<Atom>) -> Self {
        Leaf { characters }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn text(&self) -> String {
        self.characters.iter().collect()
    }

    pub fn split_at(&self, at: usize) -> (Leaf, Leaf) {
        let (left, right) = split_atoms(&self.characters, at);
        (Leaf::from_atoms(left), Leaf::from_atoms(right))
    }

    pub fn insert(&self, at: usize, atoms: &[Atom]) -> Leaf {
        Leaf::from_atoms(insert_atoms(&self.characters, at, atoms))
    }

    pub fn delete(&self, start: usize, end: usize) -> Leaf {
        Leaf::from_atoms(delete_atoms(&self.characters, start, end))
    }
}

/// A leaf carrying a set of inline tags; the unit inline formatting targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(with = "atoms_serde")]
    characters: Vec<Atom>,
    #[serde(default)]
    tags: TagSet,
}

impl Segment {
    pub fn new(text: &str, tags: TagSet) -> Self {
        Segment {
            characters: text.chars().collect(),
            tags,
        }
    }

    pub fn untagged(text: &str) -> Self {
        Segment::new(text, TagSet::new())
    }

    pub fn from_atoms(characters: Vec<Atom>, tags: TagSet) -> Self {
        Segment { characters, tags }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.characters
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn text(&self) -> String {
        self.characters.iter().collect()
    }

    pub fn with_tags(&self, tags: TagSet) -> Segment {
        Segment {
            characters: self.characters.clone(),
            tags,
        }
    }

    pub fn with_atoms(&self, characters: Vec<Atom>) -> Segment {
        Segment {
            characters,
            tags: self.tags.clone(),
        }
    }

    pub fn split_at(&self, at: usize) -> (Segment, Segment) {
        let (left, right) = split_atoms(&self.characters, at);
        (self.with_atoms(left), self.with_atoms(right))
    }

    pub fn insert(&self, at: usize, atoms: &[Atom]) -> Segment {
        self.with_atoms(insert_atoms(&self.characters, at, atoms))
    }

    pub fn delete(&self, start: usize, end: usize) -> Segment {
        self.with_atoms(delete_atoms(&self.characters, start, end))
    }

    /// Concatenates `other` onto this segment, keeping this segment's tags.
    pub fn append(&self, other: &Segment) -> Segment {
        let mut characters = self.characters.clone();
        characters.extend_from_slice(&other.characters);
        self.with_atoms(characters)
    }
}

impl From<Leaf> for Segment {
    fn from(leaf: Leaf) -> Self {
        Segment::from_atoms(leaf.characters, TagSet::new())
    }
}

fn split_atoms(atoms: &[Atom], at: usize) -> (Vec<Atom>, Vec<Atom>) {
    let at = at.min(atoms.len());
    (atoms[..at].to_vec(), atoms[at..].to_vec())
}

fn insert_atoms(atoms: &[Atom], at: usize, inserted: &[Atom]) -> Vec<Atom> {
    let at = at.min(atoms.len());
    let mut out = Vec::with_capacity(atoms.len() + inserted.len());
    out.extend_from_slice(&atoms[..at]);
    out.extend_from_slice(inserted);
    out.extend_from_slice(&atoms[at..]);
    out
}

fn delete_atoms(atoms: &[Atom], start: usize, end: usize) -> Vec<Atom> {
    let end = end.min(atoms.len());
    let start = start.min(end);
    let mut out = atoms[..start].to_vec();
    out.extend_from_slice(&atoms[end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_at_every_offset_reassembles() {
        let leaf = Leaf::new("hello");
        for at in 0..=leaf.len() {
            let (left, right) = leaf.split_at(at);
            assert_eq!(format!("{}{}", left.text(), right.text()), "hello");
            assert_eq!(left.len(), at);
        }
    }

    #[test]
    fn split_past_the_end_clamps() {
        let (left, right) = Leaf::new("abc").split_at(10);
        assert_eq!(left.text(), "abc");
        assert!(right.is_empty());
    }

    #[test]
    fn segment_operations_keep_tags() {
        let tags: TagSet = ["em"].into_iter().collect();
        let segment = Segment::new("bold move", tags.clone());

        let inserted = segment.insert(4, &['!']);
        assert_eq!(inserted.text(), "bold! move");
        assert_eq!(inserted.tags(), &tags);

        let deleted = segment.delete(4, 9);
        assert_eq!(deleted.text(), "bold");
        assert_eq!(deleted.tags(), &tags);
    }

    #[test]
    fn delete_with_reversed_range_is_a_no_op() {
        assert_eq!(Leaf::new("abc").delete(2, 1).text(), "abc");
    }
}
