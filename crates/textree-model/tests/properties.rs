use pretty_assertions::assert_eq;
use rstest::rstest;
use textree_model::fixture::parse_node;
use textree_model::{Document, Node, TagSet};

const DOCUMENTS: [&str; 4] = [
    "document<p<'Hello ' (em)'there'> h1<'Heading'> p<>>",
    "document<ul<li<p<'Aaa'>> li<p<'B' (strong)'bb'> ol<li<'c'> li<''>>>> p<'Ddd'>>",
    "document<blockquote<p<'quoted'> p<'twice'>> p@2<'indented'>>",
    "document<p<'' 'x' ''> p<'y'>>",
];

fn document(source: &str) -> Document {
    Document::from_fixture(source).unwrap()
}

fn boundary_sums_hold(node: &Node) {
    if node.children().is_empty() {
        if !matches!(node, Node::Leaf(_) | Node::Segment(_)) {
            assert_eq!(node.boundaries_length(), 1);
        }
        return;
    }
    let sum: usize = node.children().iter().map(|c| c.boundaries_length()).sum();
    assert_eq!(node.boundaries_length(), sum);
    for child in node.children() {
        boundary_sums_hold(child);
    }
}

#[rstest]
fn boundary_counts_sum_over_children(#[values(0, 1, 2, 3)] idx: usize) {
    let node = parse_node(DOCUMENTS[idx]).unwrap();
    boundary_sums_hold(&node);
}

#[rstest]
fn split_reassembles(#[values(0, 1, 2, 3)] idx: usize) {
    let node = parse_node(DOCUMENTS[idx]).unwrap();
    for at in 0..=node.length() {
        assert!(node.split(at).content_eq(&node), "split at {at}");
        let (left, right) = node.split_at(at);
        let mut atoms = left.atoms();
        atoms.extend(right.atoms());
        assert_eq!(atoms, node.atoms(), "split_at {at}");
    }
}

#[rstest]
fn toggling_twice_restores_content(
    #[values(0, 1, 2, 3)] idx: usize,
    #[values("em", "strong")] tag: &str,
) {
    let document = document(DOCUMENTS[idx]);
    let tags: TagSet = [tag].into_iter().collect();
    let last = document.boundaries_length() - 1;
    for (lb, rb) in [(0, last), (1, last / 2), (last / 3, last)] {
        let twice = document.toggle_tags(&tags, lb, rb).toggle_tags(&tags, lb, rb);
        assert!(twice.content_eq(&document), "{lb}..{rb}");
    }
}

#[rstest]
fn delete_then_insert_restores_atoms(#[values(0, 1, 2, 3)] idx: usize) {
    let document = document(DOCUMENTS[idx]);
    let atoms = document.atoms();
    let len = atoms.len();
    for (start, end) in [(0, len), (1, len / 2), (len / 3, len), (2, 3)] {
        let end = end.min(len);
        let start = start.min(end);
        let removed: String = atoms[start..end].iter().collect();
        let restored = document.delete(start, end).insert(start, &removed);
        assert_eq!(restored.atoms(), atoms, "{start}..{end}");
    }
}

#[rstest]
fn cursor_boundaries_are_ordered(#[values(0, 1, 2, 3)] idx: usize) {
    let document = document(DOCUMENTS[idx]);
    let mut previous = (0, 0);
    for cursor in 0..document.total_cursor_positions() {
        let left = document.cursor_to_boundary_favor_left(cursor);
        let right = document.cursor_to_boundary_favor_right(cursor);
        assert!(left <= right, "cursor {cursor}");
        assert!(left >= previous.0 && right >= previous.1, "cursor {cursor}");
        assert_eq!(document.boundary_to_cursor(left), cursor);
        previous = (left, right);
    }
}

#[rstest]
fn copies_are_structurally_equal(#[values(0, 1, 2, 3)] idx: usize) {
    let document = document(DOCUMENTS[idx]);
    assert!(document.copy().structure_eq(&document));
}

#[rstest]
fn json_round_trips(#[values(0, 1, 2, 3)] idx: usize) {
    let document = document(DOCUMENTS[idx]);
    let json = document.to_json().unwrap();
    assert_eq!(Document::from_json(&json).unwrap(), document);
}

#[test]
fn every_variant_survives_json() {
    let node = parse_node("composite<'a' ()'b' gap p<'c'> ul<li<'d'>> document<h1<'e'>>>").unwrap();
    let json = node.to_json().unwrap();
    assert!(Node::from_json(&json).unwrap().structure_eq(&node));
}

#[test]
fn cached_sizes_are_recomputed_on_load() {
    let json = r#"{
        "type": "context",
        "blockTag": "p",
        "indentationAmount": 0,
        "length": 999,
        "boundariesLength": 999,
        "overCount": 999,
        "subPieces": [
            {"type": "segment", "characters": "ab", "tags": ["em"]},
            {"type": "segment", "characters": "cd", "tags": []}
        ]
    }"#;
    let node = Node::from_json(json).unwrap();
    assert_eq!(node.length(), 4);
    assert_eq!(node.boundaries_length(), 6);
    assert_eq!(node.total_cursor_positions(), 5);
}
