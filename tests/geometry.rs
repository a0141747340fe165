//! Tests for the anchor-point geometry.
mod common;
use common::*;
use keiro::prelude::*;

fn node_at(id: &str, x: f64, y: f64) -> GraphNode {
    GraphNode::new(id, Position::new(x, y), NodeData::default())
}

fn terminal_node_at(id: &str, x: f64, y: f64) -> GraphNode {
    let mut node = node_at(id, x, y);
    node.data.is_terminal = true;
    node
}

#[test]
fn test_anchor_coordinates() {
    let node = node_at("n", 0.0, 0.0);
    assert_eq!(Anchor::TopLeft.point(&node), (0.0, 0.0));
    assert_eq!(Anchor::TopCenter.point(&node), (NODE_WIDTH / 2.0, 0.0));
    assert_eq!(Anchor::TopRight.point(&node), (NODE_WIDTH, 0.0));
    assert_eq!(Anchor::BottomLeft.point(&node), (0.0, NODE_HEIGHT));
    assert_eq!(
        Anchor::BottomCenter.point(&node),
        (NODE_WIDTH / 2.0, NODE_HEIGHT)
    );
    assert_eq!(Anchor::BottomRight.point(&node), (NODE_WIDTH, NODE_HEIGHT));
    assert_eq!(Anchor::Left.point(&node), (0.0, NODE_HEIGHT / 2.0));
    assert_eq!(Anchor::Right.point(&node), (NODE_WIDTH, NODE_HEIGHT / 2.0));
}

#[test]
fn test_anchor_coordinates_follow_position() {
    let node = node_at("n", 100.0, 40.0);
    assert_eq!(Anchor::TopLeft.point(&node), (100.0, 40.0));
    assert_eq!(
        Anchor::BottomCenter.point(&node),
        (100.0 + NODE_WIDTH / 2.0, 40.0 + NODE_HEIGHT)
    );
}

#[test]
fn test_render_pair_picks_closest_anchors() {
    let source = node_at("a", 0.0, 0.0);
    let target = node_at("b", 400.0, 300.0);

    // Diagonal placement: the facing corners are strictly closest.
    let (s, t) = anchor_pair_for_render(&source, &target);
    assert_eq!(s, Anchor::BottomRight);
    assert_eq!(t, Anchor::TopLeft);

    // Pure function of the inputs: identical on every call.
    assert_eq!(anchor_pair_for_render(&source, &target), (s, t));
}

#[test]
fn test_new_connection_pair_skips_used_anchors() {
    let source = node_at("a", 0.0, 0.0);
    let target = node_at("b", 400.0, 300.0);

    let pair = anchor_pair_for_new_connection(
        &source,
        &target,
        &[Anchor::BottomRight],
        &[],
    );
    // With the facing corner taken, the right edge midpoint is next best.
    assert_eq!(pair, Some((Anchor::Right, Anchor::TopLeft)));
}

#[test]
fn test_new_connection_rejected_when_target_full() {
    let source = node_at("a", 0.0, 0.0);
    let target = node_at("b", 400.0, 300.0);

    let pair = anchor_pair_for_new_connection(&source, &target, &[], &Anchor::ALL);
    assert_eq!(pair, None);
}

#[test]
fn test_new_connection_rejected_when_source_full() {
    let source = node_at("a", 0.0, 0.0);
    let target = node_at("b", 400.0, 300.0);

    let pair = anchor_pair_for_new_connection(&source, &target, &Anchor::ALL, &[]);
    assert_eq!(pair, None);
}

#[test]
fn test_terminal_source_hosts_no_outgoing_anchors() {
    let source = terminal_node_at("end", 0.0, 0.0);
    let target = node_at("b", 400.0, 300.0);

    let pair = anchor_pair_for_new_connection(&source, &target, &[], &[]);
    assert_eq!(pair, None);
}

#[test]
fn test_terminal_step_node_carries_terminal_flag() {
    // The store derives the flag geometry relies on to refuse outgoing
    // anchors from terminal steps.
    let store = open_store(create_fork_flow());
    let source = store.node("publish").unwrap();
    let target = store.node("merge").unwrap();

    assert!(source.data.is_terminal);
    let pair = anchor_pair_for_new_connection(source, target, &[], &[]);
    assert_eq!(pair, None, "publish is terminal");
    assert!(!store.is_dirty());
}

#[test]
fn test_anchor_string_round_trip() {
    for anchor in Anchor::ALL {
        assert_eq!(Anchor::parse(anchor.as_str()), Some(anchor));
    }
    assert_eq!(Anchor::parse("bottom-center"), Some(Anchor::BottomCenter));
    assert_eq!(Anchor::parse("middle"), None);
}
