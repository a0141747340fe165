//! One-time hierarchical auto-layout for definitions without positions.

use crate::flow::{FlowDefinition, Position};
use crate::geometry::{NODE_HEIGHT, NODE_WIDTH};
use crate::graph::GraphEdge;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::VecDeque;

const MARGIN: f64 = 40.0;
const H_GAP: f64 = 80.0;
const V_GAP: f64 = 64.0;

/// Assigns a position to every step, layering top-to-bottom by edge
/// direction: a step's rank is one below its deepest predecessor, steps
/// within a rank are laid out left-to-right in id order on a fixed grid.
///
/// The caller only invokes this when no step has a stored position, so a
/// manual arrangement is never overwritten.
pub(crate) fn assign_positions(flow: &mut FlowDefinition, edges: &[GraphEdge]) {
    if flow.steps.is_empty() {
        return;
    }

    // Unique (source, target) pairs; parallel edge kinds between the same
    // steps must not inflate in-degrees.
    let pairs: AHashSet<(&str, &str)> = edges
        .iter()
        .filter(|e| e.source != e.target)
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();

    let mut children: AHashMap<&str, Vec<&str>> = AHashMap::new();
    let mut indegree: AHashMap<&str, usize> = flow.steps.keys().map(|id| (id.as_str(), 0)).collect();
    for (source, target) in pairs {
        if !indegree.contains_key(source) || !indegree.contains_key(target) {
            continue;
        }
        children.entry(source).or_default().push(target);
        *indegree.entry(target).or_default() += 1;
    }
    for list in children.values_mut() {
        list.sort_unstable();
    }

    let mut rank: AHashMap<&str, usize> = AHashMap::new();
    let mut queue: VecDeque<&str> = indegree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(id, _)| *id)
        .sorted()
        .collect();
    for id in &queue {
        rank.insert(*id, 0);
    }
    if queue.is_empty() {
        // Every step sits on a cycle; break it at the start step when one
        // is set, otherwise at the lexicographically first step.
        let seed = flow
            .steps
            .get(&flow.start_step_instance_id)
            .map(|s| s.step_instance_id.as_str())
            .unwrap_or_else(|| flow.steps.keys().map(String::as_str).min().unwrap_or_default());
        rank.insert(seed, 0);
        queue.push_back(seed);
    }

    while let Some(id) = queue.pop_front() {
        let here = rank.get(id).copied().unwrap_or(0);
        for &child in children.get(id).map(Vec::as_slice).unwrap_or(&[]) {
            let proposed = here + 1;
            let entry = rank.entry(child).or_insert(proposed);
            if *entry < proposed {
                *entry = proposed;
            }
            let deg = indegree.entry(child).or_default();
            *deg = deg.saturating_sub(1);
            if *deg == 0 {
                queue.push_back(child);
            }
        }
    }

    // Cycle leftovers land together below the deepest ranked row.
    let deepest = rank.values().copied().max().unwrap_or(0);
    let leftovers: Vec<&str> = flow
        .steps
        .keys()
        .map(String::as_str)
        .filter(|id| !rank.contains_key(*id))
        .sorted()
        .collect();
    for id in leftovers {
        rank.insert(id, deepest + 1);
    }

    let mut rows: AHashMap<usize, Vec<&str>> = AHashMap::new();
    for (&id, &r) in &rank {
        rows.entry(r).or_default().push(id);
    }

    let mut positions: AHashMap<String, Position> = AHashMap::new();
    for (r, mut ids) in rows {
        ids.sort_unstable();
        for (col, id) in ids.into_iter().enumerate() {
            positions.insert(
                id.to_string(),
                Position::new(
                    MARGIN + col as f64 * (NODE_WIDTH + H_GAP),
                    MARGIN + r as f64 * (NODE_HEIGHT + V_GAP),
                ),
            );
        }
    }

    for step in flow.steps.values_mut() {
        step.position = positions.get(&step.step_instance_id).copied();
    }
}
