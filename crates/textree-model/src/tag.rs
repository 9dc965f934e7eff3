//! Inline tags carried by segments and the block tag vocabulary carried by
//! contexts.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownBlockTag;

/// A case-insensitive inline label such as `em` or `strong`.
///
/// Labels are normalised to lowercase on construction so that `Strong` and
/// `strong` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    pub fn new(label: impl AsRef<str>) -> Self {
        Tag(label.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(label: &str) -> Self {
        Tag::new(label)
    }
}

impl From<String> for Tag {
    fn from(label: String) -> Self {
        Tag::new(label)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An unordered, deduplicated set of inline tags.
///
/// Backed by a `BTreeSet` so iteration (and therefore rendering and fixture
/// printing) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    pub const fn new() -> Self {
        TagSet(BTreeSet::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    pub fn insert(&mut self, tag: impl Into<Tag>) -> bool {
        self.0.insert(tag.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn union(&self, other: &TagSet) -> TagSet {
        TagSet(self.0.union(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &TagSet) -> TagSet {
        TagSet(self.0.difference(&other.0).cloned().collect())
    }

    pub fn symmetric_difference(&self, other: &TagSet) -> TagSet {
        TagSet(self.0.symmetric_difference(&other.0).cloned().collect())
    }
}

impl<T: Into<Tag>> FromIterator<T> for TagSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        TagSet(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::collections::btree_set::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The block-level vocabulary a [`Context`](crate::Context) may carry.
///
/// List containers (`ul`, `ol`) and list items (`li`) are the tags under
/// which contexts are expected to nest further contexts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockTag {
    #[default]
    #[serde(rename = "p")]
    Paragraph,
    #[serde(rename = "h1")]
    Heading1,
    #[serde(rename = "h2")]
    Heading2,
    #[serde(rename = "h3")]
    Heading3,
    #[serde(rename = "h4")]
    Heading4,
    #[serde(rename = "h5")]
    Heading5,
    #[serde(rename = "h6")]
    Heading6,
    #[serde(rename = "blockquote")]
    BlockQuote,
    #[serde(rename = "pre")]
    Preformatted,
    #[serde(rename = "ul")]
    UnorderedList,
    #[serde(rename = "ol")]
    OrderedList,
    #[serde(rename = "li")]
    ListItem,
}

impl BlockTag {
    pub const ALL: [BlockTag; 12] = [
        BlockTag::Paragraph,
        BlockTag::Heading1,
        BlockTag::Heading2,
        BlockTag::Heading3,
        BlockTag::Heading4,
        BlockTag::Heading5,
        BlockTag::Heading6,
        BlockTag::BlockQuote,
        BlockTag::Preformatted,
        BlockTag::UnorderedList,
        BlockTag::OrderedList,
        BlockTag::ListItem,
    ];

    /// The element name, which is also the fixture and JSON spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockTag::Paragraph => "p",
            BlockTag::Heading1 => "h1",
            BlockTag::Heading2 => "h2",
            BlockTag::Heading3 => "h3",
            BlockTag::Heading4 => "h4",
            BlockTag::Heading5 => "h5",
            BlockTag::Heading6 => "h6",
            BlockTag::BlockQuote => "blockquote",
            BlockTag::Preformatted => "pre",
            BlockTag::UnorderedList => "ul",
            BlockTag::OrderedList => "ol",
            BlockTag::ListItem => "li",
        }
    }

    /// `ul` or `ol`.
    pub fn is_list(self) -> bool {
        matches!(self, BlockTag::UnorderedList | BlockTag::OrderedList)
    }

    /// `ul`, `ol` or `li`.
    pub fn is_list_structure(self) -> bool {
        self.is_list() || self == BlockTag::ListItem
    }
}

impl FromStr for BlockTag {
    type Err = UnknownBlockTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BlockTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownBlockTag(s.to_string()))
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
