//! Anchor-point geometry for node connections.
//!
//! Every node exposes eight fixed anchor points on its bounding box. Edge
//! rendering picks the visually shortest anchor pair on every frame;
//! new-connection gestures pick the shortest pair among anchors not already
//! occupied by another edge. Both selections are pure functions.

use crate::graph::GraphNode;
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed node footprint used for anchor formulas and auto-layout when the
/// rendering surface has not reported a measured size.
pub const NODE_WIDTH: f64 = 220.0;
pub const NODE_HEIGHT: f64 = 88.0;

/// One of the eight fixed connection points on a node's visual boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Left,
    Right,
}

impl Anchor {
    pub const ALL: [Anchor; 8] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
        Anchor::Left,
        Anchor::Right,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopCenter => "top-center",
            Anchor::TopRight => "top-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomCenter => "bottom-center",
            Anchor::BottomRight => "bottom-right",
            Anchor::Left => "left",
            Anchor::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Anchor> {
        Anchor::ALL.iter().copied().find(|a| a.as_str() == s)
    }

    /// The canvas coordinate of this anchor on `node`'s bounding box.
    pub fn point(&self, node: &GraphNode) -> (f64, f64) {
        let (x, y) = (node.position.x, node.position.y);
        let (w, h) = (node.width, node.height);
        match self {
            Anchor::TopLeft => (x, y),
            Anchor::TopCenter => (x + w / 2.0, y),
            Anchor::TopRight => (x + w, y),
            Anchor::BottomLeft => (x, y + h),
            Anchor::BottomCenter => (x + w / 2.0, y + h),
            Anchor::BottomRight => (x + w, y + h),
            Anchor::Left => (x, y + h / 2.0),
            Anchor::Right => (x + w, y + h / 2.0),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn squared_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

fn closest_pair(
    source: &GraphNode,
    target: &GraphNode,
    source_candidates: &[Anchor],
    target_candidates: &[Anchor],
) -> Option<(Anchor, Anchor)> {
    iproduct!(source_candidates.iter(), target_candidates.iter())
        .map(|(s, t)| (*s, *t))
        .min_by(|(s1, t1), (s2, t2)| {
            let d1 = squared_distance(s1.point(source), t1.point(target));
            let d2 = squared_distance(s2.point(source), t2.point(target));
            d1.total_cmp(&d2)
        })
}

/// Selects the anchor pair with the minimal squared distance between two
/// connected nodes, unconstrained by anchor usage.
///
/// Used for drawing an existing edge: recomputed on every render, free of
/// side effects, so a node drag immediately re-routes its edges.
pub fn anchor_pair_for_render(source: &GraphNode, target: &GraphNode) -> (Anchor, Anchor) {
    // Both candidate sets are the full non-empty anchor list.
    closest_pair(source, target, &Anchor::ALL, &Anchor::ALL)
        .unwrap_or((Anchor::BottomCenter, Anchor::TopCenter))
}

/// Selects the closest anchor pair for a new connection, excluding anchors
/// already occupied by other edges on either node.
///
/// A terminal-step source hosts no outgoing anchors at all. Returns `None`
/// when either side has no free anchor left; the caller rejects the
/// connection without creating any partial state.
pub fn anchor_pair_for_new_connection(
    source: &GraphNode,
    target: &GraphNode,
    used_source: &[Anchor],
    used_target: &[Anchor],
) -> Option<(Anchor, Anchor)> {
    if source.data.is_terminal {
        return None;
    }
    let free = |used: &[Anchor]| -> Vec<Anchor> {
        Anchor::ALL
            .iter()
            .copied()
            .filter(|a| !used.contains(a))
            .collect()
    };
    let source_candidates = free(used_source);
    let target_candidates = free(used_target);
    if source_candidates.is_empty() || target_candidates.is_empty() {
        return None;
    }
    closest_pair(source, target, &source_candidates, &target_candidates)
}
