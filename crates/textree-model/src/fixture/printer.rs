use crate::node::Node;
use crate::tag::TagSet;

/// Writes `node` in canonical fixture notation.
pub fn print_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, false, &mut out);
    out
}

/// `in_block` is true directly inside a context or document, where
/// untagged quoted text reads back as a segment.
fn write_node(node: &Node, in_block: bool, out: &mut String) {
    match node {
        Node::Leaf(leaf) => write_quoted(&leaf.text(), out),
        Node::Segment(segment) => {
            if !in_block || !segment.tags().is_empty() {
                write_tags(segment.tags(), out);
            }
            write_quoted(&segment.text(), out);
        }
        Node::Gap => out.push_str("gap"),
        Node::Composite(_) => {
            out.push_str("composite");
            write_children(node, false, out);
        }
        Node::Document(_) => {
            out.push_str("document");
            write_children(node, true, out);
        }
        Node::Context(context) => {
            out.push_str(context.block_tag().as_str());
            if context.indentation() > 0 {
                out.push('@');
                out.push_str(&context.indentation().to_string());
            }
            write_children(node, true, out);
        }
    }
}

fn write_children(node: &Node, in_block: bool, out: &mut String) {
    out.push('<');
    let mut previous: Option<&Node> = None;
    for child in node.children() {
        if let Some(previous) = previous
            && !(previous.is_context() && child.is_context())
        {
            out.push(' ');
        }
        write_node(child, in_block, out);
        previous = Some(child);
    }
    out.push('>');
}

fn write_tags(tags: &TagSet, out: &mut String) {
    out.push('(');
    for (idx, tag) in tags.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push_str(tag.as_str());
    }
    out.push(')');
}

fn write_quoted(text: &str, out: &mut String) {
    out.push('\'');
    for c in text.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::parse_node;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("p<'a' (em)'b'>")]
    #[case("composite<'a' ()'b' composite<> gap>")]
    #[case("document<h1@1<'x'>ul<li<p<'y'>ol<li<'z'>>>>p<>>")]
    #[case(r"p<'it\'s' 'back\\slash'>")]
    #[case("blockquote<p<(em, strong)''>>")]
    fn canonical_text_reprints_unchanged(#[case] source: &str) {
        let node = parse_node(source).unwrap();
        assert_eq!(print_node(&node), source);
        assert!(parse_node(&print_node(&node)).unwrap().structure_eq(&node));
    }

    #[test]
    fn layout_is_normalised() {
        let node = parse_node(
            "ul<  # first item\n  li< p<'a'> >\n  li<p<'b'>>\n>",
        )
        .unwrap();
        assert_eq!(print_node(&node), "ul<li<p<'a'>>li<p<'b'>>>");
    }
}
