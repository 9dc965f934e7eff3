//! Indentation as list restructuring.
//!
//! Inside a list, indenting wraps the selected run of items in a new
//! `li<ul<...>>` pair and outdenting lifts items out of the nested list
//! that holds them. Both only re-parent existing contexts, so atom content
//! and boundary count are unchanged; the context factory re-derives which
//! nodes are text and which are heterogeneous.
//!
//! Block retagging also lives here, since list tags create lists and other
//! tags take items out of them.

use std::sync::Arc;

use crate::composite::boundary_offset;
use crate::context::{Context, concat, contexts_of, into_nodes, map_intersecting};
use crate::node::Node;
use crate::operation::SetBlock;
use crate::tag::BlockTag;

/// Applies one level of indentation (`delta` of `1` or `-1`) to the parts of
/// `context` intersecting the boundary range `lb..=rb`.
pub(crate) fn indent_range(context: &Context, delta: isize, lb: usize, rb: usize) -> Vec<Context> {
    if context.is_text() {
        return vec![context.indent(delta)];
    }
    if context.block_tag().is_list() {
        return if delta > 0 {
            vec![nest(context, lb, rb)]
        } else {
            unnest(context, lb, rb)
        };
    }
    let children = map_intersecting(context.children(), lb, rb, |child, lb, rb| {
        indent_range(child, delta, lb, rb)
    });
    vec![context.with_children(children)]
}

/// Inclusive boundary range owned by child `idx`.
fn child_span(children: &[Arc<Node>], idx: usize) -> (usize, usize) {
    let start = boundary_offset(children, idx);
    (start, start + children[idx].boundaries_length() - 1)
}

/// First and last child whose boundaries intersect `lb..=rb`.
pub(crate) fn hit_range(children: &[Arc<Node>], lb: usize, rb: usize) -> Option<(usize, usize)> {
    let mut hit: Option<(usize, usize)> = None;
    for idx in 0..children.len() {
        let (start, end) = child_span(children, idx);
        if start <= rb && lb <= end {
            hit = Some(match hit {
                Some((first, _)) => (first, idx),
                None => (idx, idx),
            });
        }
    }
    hit
}

/// The nested list inside `item` that fully contains `lb..=rb`, with its
/// index and the range translated to its own addresses.
fn nested_list_containing(item: &Context, lb: usize, rb: usize) -> Option<(usize, Context, usize, usize)> {
    if item.is_text() {
        return None;
    }
    let children = item.children();
    (0..children.len()).find_map(|idx| {
        let nested = children[idx].as_context()?;
        let (start, end) = child_span(children, idx);
        (nested.block_tag().is_list() && start <= lb && rb <= end)
            .then(|| (idx, nested.clone(), lb - start, rb - start))
    })
}

/// Indents the items of `list` intersecting `lb..=rb` by one level.
pub(crate) fn nest(list: &Context, lb: usize, rb: usize) -> Context {
    let children = list.children();
    let Some((first, last)) = hit_range(children, lb, rb) else {
        return list.clone();
    };

    if first == last
        && let Some(item) = children[first].as_context()
    {
        let (start, _) = child_span(children, first);
        if let Some((idx, nested, nested_lb, nested_rb)) =
            nested_list_containing(item, lb.max(start) - start, rb - start)
        {
            let item = item.with_children(concat(
                &item.children()[..idx],
                vec![nest(&nested, nested_lb, nested_rb)],
                &item.children()[idx + 1..],
            ));
            return list.with_children(concat(
                &children[..first],
                vec![item],
                &children[last + 1..],
            ));
        }
    }

    log::debug!("nesting items {first}..={last} of {}", list.block_tag());
    let run = children[first..=last].to_vec();
    let nested = Context::new(list.block_tag(), 0, run);
    let wrapper = Context::new(BlockTag::ListItem, 0, into_nodes(vec![nested]));
    list.with_children(concat(
        &children[..first],
        vec![wrapper],
        &children[last + 1..],
    ))
}

/// Outdents the items of `list` intersecting `lb..=rb` by one level.
///
/// Items of a nested list move up into the enclosing list. Top-level items
/// leave the list altogether: their contexts become siblings of the list
/// (a text item turning into a paragraph) and the list is cut around them.
pub(crate) fn unnest(list: &Context, lb: usize, rb: usize) -> Vec<Context> {
    let children = list.children();
    let Some((first, last)) = hit_range(children, lb, rb) else {
        return vec![list.clone()];
    };

    if first == last
        && let Some(item) = children[first].as_context()
    {
        let (start, _) = child_span(children, first);
        if nested_list_containing(item, lb.max(start) - start, rb - start).is_some() {
            let promoted = promote(item, lb.max(start) - start, rb - start);
            return vec![list.with_children(concat(
                &children[..first],
                promoted,
                &children[last + 1..],
            ))];
        }
    }

    log::debug!("lifting items {first}..={last} out of {}", list.block_tag());
    let mut out = Vec::new();
    if first > 0 {
        out.push(list.with_children(children[..first].to_vec()));
    }
    for item in contexts_of(&children[first..=last]) {
        if item.is_text() {
            let block_tag = if item.block_tag() == BlockTag::ListItem {
                BlockTag::Paragraph
            } else {
                item.block_tag()
            };
            out.push(item.update_block(block_tag));
        } else {
            out.extend(contexts_of(item.children()));
        }
    }
    if last + 1 < children.len() {
        out.push(list.with_children(children[last + 1..].to_vec()));
    }
    out
}

/// Lifts the items of `item`'s nested list that intersect `lb..=rb` into
/// the list holding `item`, returning the replacement items.
///
/// What preceded the run stays in `item`; nested items after the run, and
/// anything `item` held after its nested list, move under the last lifted
/// item.
fn promote(item: &Context, lb: usize, rb: usize) -> Vec<Context> {
    let Some((idx, nested, nested_lb, nested_rb)) = nested_list_containing(item, lb, rb) else {
        return vec![item.clone()];
    };
    let inner = nested.children();
    let Some((first, last)) = hit_range(inner, nested_lb, nested_rb) else {
        return vec![item.clone()];
    };

    if first == last
        && let Some(inner_item) = inner[first].as_context()
    {
        let (start, _) = child_span(inner, first);
        let local_lb = nested_lb.max(start) - start;
        let local_rb = nested_rb - start;
        if nested_list_containing(inner_item, local_lb, local_rb).is_some() {
            let nested = nested.with_children(concat(
                &inner[..first],
                promote(inner_item, local_lb, local_rb),
                &inner[last + 1..],
            ));
            return vec![item.with_children(concat(
                &item.children()[..idx],
                vec![nested],
                &item.children()[idx + 1..],
            ))];
        }
    }

    log::debug!("promoting nested items {first}..={last}");
    let mut out = Vec::new();

    let mut head = item.children()[..idx].to_vec();
    if first > 0 {
        head.extend(into_nodes(vec![nested.with_children(inner[..first].to_vec())]));
    }
    if !head.is_empty() {
        out.push(item.with_children(head));
    }

    let mut run = contexts_of(&inner[first..=last]);
    let mut tail = Vec::new();
    if last + 1 < inner.len() {
        tail.extend(into_nodes(vec![nested.with_children(inner[last + 1..].to_vec())]));
    }
    tail.extend_from_slice(&item.children()[idx + 1..]);
    if !tail.is_empty()
        && let Some(last_item) = run.pop()
    {
        let mut children = last_item.children().to_vec();
        children.extend(tail);
        run.push(last_item.with_children(children));
    }
    out.extend(run);
    out
}

/// Assigns `set`'s block tag to the contexts of `children` intersecting
/// `lb..=rb`.
///
/// A list tag turns each run of intersecting text contexts into one list
/// (a `li` tag makes a `ul`), every context becoming the text of its own
/// item, and switches intersecting lists between `ul` and `ol`. Any other
/// tag retags text in place and takes intersecting items out of their
/// lists.
pub(crate) fn retag(children: &[Arc<Node>], set: SetBlock, lb: usize, rb: usize) -> Vec<Context> {
    let block_tag = set.block_tag();
    let mut out = Vec::with_capacity(children.len());
    let mut items = Vec::new();
    let mut start = 0;
    for child in children {
        let end = start + child.boundaries_length() - 1;
        let hit = start <= rb && lb <= end;
        let (local_lb, local_rb) = (lb.max(start) - start, rb.min(end) - start);
        start = end + 1;
        let Some(context) = child.as_context() else {
            continue;
        };
        if hit && block_tag.is_list_structure() && context.is_text() {
            items.push(list_item(context));
            continue;
        }
        flush_items(&mut items, block_tag, &mut out);
        if hit {
            out.extend(retag_context(context, set, local_lb, local_rb));
        } else {
            out.push(context.clone());
        }
    }
    flush_items(&mut items, block_tag, &mut out);
    out
}

fn retag_context(context: &Context, set: SetBlock, lb: usize, rb: usize) -> Vec<Context> {
    let block_tag = set.block_tag();
    if context.block_tag().is_list() {
        return match block_tag {
            BlockTag::UnorderedList | BlockTag::OrderedList => vec![set.retag(context)],
            BlockTag::ListItem => vec![context.clone()],
            _ => dissolve(context, set, lb, rb),
        };
    }
    if context.is_text() {
        if block_tag.is_list_structure() {
            return vec![context.clone()];
        }
        return vec![set.retag(context)];
    }
    vec![context.with_children(into_nodes(retag(context.children(), set, lb, rb)))]
}

fn list_item(context: &Context) -> Context {
    let text = if context.block_tag() == BlockTag::ListItem {
        context.update_block(BlockTag::Paragraph)
    } else {
        context.clone()
    };
    Context::new(BlockTag::ListItem, 0, into_nodes(vec![text]))
}

fn flush_items(items: &mut Vec<Context>, block_tag: BlockTag, out: &mut Vec<Context>) {
    if items.is_empty() {
        return;
    }
    let list_tag = if block_tag.is_list() {
        block_tag
    } else {
        BlockTag::UnorderedList
    };
    log::debug!("wrapping {} contexts in a new {list_tag}", items.len());
    out.push(Context::new(list_tag, 0, into_nodes(std::mem::take(items))));
}

/// Takes the items of `list` intersecting `lb..=rb` out of it, retagging
/// their text. Nested lists reached by the range dissolve the same way;
/// everything else stays in what remains of the lists around the range.
fn dissolve(list: &Context, set: SetBlock, lb: usize, rb: usize) -> Vec<Context> {
    let children = list.children();
    let Some((first, last)) = hit_range(children, lb, rb) else {
        return vec![list.clone()];
    };

    log::debug!(
        "dissolving items {first}..={last} of {} into {}",
        list.block_tag(),
        set.block_tag()
    );
    let mut out = Vec::new();
    if first > 0 {
        out.push(list.with_children(children[..first].to_vec()));
    }
    for idx in first..=last {
        let Some(item) = children[idx].as_context() else {
            continue;
        };
        if item.is_text() {
            out.push(set.retag(item));
            continue;
        }
        let (start, end) = child_span(children, idx);
        out.extend(retag(
            item.children(),
            set,
            lb.max(start) - start,
            rb.min(end) - start,
        ));
    }
    if last + 1 < children.len() {
        out.push(list.with_children(children[last + 1..].to_vec()));
    }
    out
}
