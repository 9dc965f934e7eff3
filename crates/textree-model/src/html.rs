//! HTML rendering of a tree.
//!
//! Each context becomes an element named after its block tag, with a
//! `margin-left` proportional to its indentation. A text context with no
//! atoms gets an empty-line marker so it keeps its height in the browser.
//! Each segment nests one element per inline tag around its escaped text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::composite::Composite;
use crate::context::Context;
use crate::document::Document;
use crate::leaf::{Leaf, Segment};
use crate::node::Node;
use crate::visit::Visitor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlOptions {
    /// Left margin per indentation level, in `em`.
    pub indent_step_em: u32,
    /// Markup placed inside contexts that have no text.
    pub empty_line_marker: String,
    /// Element to use for an inline tag; tags not listed use their own
    /// name.
    pub tag_elements: BTreeMap<String, String>,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            indent_step_em: 2,
            empty_line_marker: "<br>".to_string(),
            tag_elements: BTreeMap::new(),
        }
    }
}

impl HtmlOptions {
    fn element_for<'a>(&'a self, tag: &'a str) -> &'a str {
        self.tag_elements.get(tag).map_or(tag, String::as_str)
    }
}

pub struct HtmlRenderer<'a> {
    options: &'a HtmlOptions,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(options: &'a HtmlOptions) -> Self {
        Self { options }
    }

    fn children(&mut self, children: &[std::sync::Arc<Node>]) -> String {
        children.iter().map(|child| child.accept(self)).collect()
    }
}

impl Visitor for HtmlRenderer<'_> {
    type Output = String;

    fn visit_leaf(&mut self, leaf: &Leaf) -> String {
        html_escape::encode_safe(&leaf.text()).into_owned()
    }

    fn visit_segment(&mut self, segment: &Segment) -> String {
        let mut out = String::new();
        let elements: Vec<&str> = segment
            .tags()
            .iter()
            .map(|tag| self.options.element_for(tag.as_str()))
            .collect();
        for element in &elements {
            out.push_str(&format!("<{element}>"));
        }
        out.push_str(&html_escape::encode_safe(&segment.text()));
        for element in elements.iter().rev() {
            out.push_str(&format!("</{element}>"));
        }
        out
    }

    fn visit_composite(&mut self, composite: &Composite) -> String {
        self.children(composite.children())
    }

    fn visit_context(&mut self, context: &Context) -> String {
        let block = context.block_tag().as_str();
        let mut out = format!("<{block}");
        if context.indentation() > 0 {
            let margin = context.indentation() as u64 * u64::from(self.options.indent_step_em);
            out.push_str(&format!(" style=\"margin-left: {margin}em\""));
        }
        out.push('>');
        out.push_str(&self.children(context.children()));
        if context.is_text() && !context.block_tag().is_list() && context.length() == 0 {
            out.push_str(&self.options.empty_line_marker);
        }
        out.push_str(&format!("</{block}>"));
        out
    }

    fn visit_document(&mut self, document: &Document) -> String {
        document
            .children()
            .iter()
            .map(|child| child.accept(self))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn visit_gap(&mut self) -> String {
        String::new()
    }
}

pub fn render(node: &Node, options: &HtmlOptions) -> String {
    node.accept(&mut HtmlRenderer::new(options))
}

pub fn render_document(document: &Document, options: &HtmlOptions) -> String {
    HtmlRenderer::new(options).visit_document(document)
}
