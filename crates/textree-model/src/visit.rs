use crate::composite::Composite;
use crate::context::Context;
use crate::document::Document;
use crate::leaf::{Leaf, Segment};

/// Read-only traversal with one method per node variant.
///
/// Implementors decide whether and how to descend; [`Node::accept`]
/// dispatches a single node.
///
/// [`Node::accept`]: crate::Node::accept
pub trait Visitor {
    type Output;

    fn visit_leaf(&mut self, leaf: &Leaf) -> Self::Output;
    fn visit_segment(&mut self, segment: &Segment) -> Self::Output;
    fn visit_composite(&mut self, composite: &Composite) -> Self::Output;
    fn visit_context(&mut self, context: &Context) -> Self::Output;
    fn visit_document(&mut self, document: &Document) -> Self::Output;
    fn visit_gap(&mut self) -> Self::Output;
}
