//! The graph synchronization store: the stateful core of the editor.
//!
//! One `EditorStore` owns one editing session: the canonical
//! `FlowDefinition` plus the visual node/edge collections derived from it,
//! and the dirty flag for persistence. Every mutation operation is
//! synchronous, total and atomic: all three collections are consistent
//! whenever a call returns, and gestures against ids that no longer exist
//! degrade to no-ops instead of failing.

pub mod changes;

pub use changes::*;

use crate::flow::{FlowDefinition, LoadedFlow, Position, StepInstance, Transition};
use crate::geometry::Anchor;
use crate::graph::convert::{edges_for_step, flow_to_graph};
use crate::graph::{EdgeKind, GraphConversion, GraphEdge, GraphNode, NodeData, edge_id};
use crate::graph::branches::resolve_branch_membership;
use ahash::{AHashMap, AHashSet};
use tracing::debug;

/// Condition text given to a transition created by a connect gesture.
/// The editor prompts the user to replace it before the flow is usable.
pub const PLACEHOLDER_CONDITION: &str = "<unset>";

/// Flow metadata supplied by the loader alongside the definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowMetadata {
    pub name: String,
    pub description: String,
}

/// The editing-session state container.
///
/// Single-writer by design: one store instance per open editing session,
/// driven from one thread. Persistence is the only asynchronous boundary.
/// The caller hands `flow()` to the save service and reports success back
/// through `clear_dirty_state`; local edits continue while a save is in
/// flight, and the most recent completed save wins. The store never reads
/// or bumps `version`; conflict detection between sessions belongs to the
/// persistence service.
#[derive(Debug, Clone)]
pub struct EditorStore {
    flow: FlowDefinition,
    metadata: FlowMetadata,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    dirty: bool,
}

impl EditorStore {
    /// Opens an editing session over a loaded flow, deriving the visual
    /// collections and running the one-time auto-layout when the
    /// definition carries no positions yet.
    pub fn load(loaded: LoadedFlow) -> Self {
        let GraphConversion { nodes, edges, flow } = flow_to_graph(&loaded.definition);
        Self {
            flow,
            metadata: FlowMetadata {
                name: loaded.name,
                description: loaded.description,
            },
            nodes,
            edges,
            dirty: false,
        }
    }

    /// The canonical definition; hand a clone of this to the save service.
    pub fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    pub fn metadata(&self) -> &FlowMetadata {
        &self.metadata
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Whether local edits exist that have not been successfully saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Writes changed node positions through to both the visual node and
    /// the owning step instance. Dirty only when something actually moved.
    pub fn apply_position_changes(&mut self, changes: &[PositionChange]) {
        let mut moved = false;
        for change in changes {
            let Some(node) = self.nodes.iter_mut().find(|n| n.id == change.id) else {
                continue;
            };
            if node.position == change.position {
                continue;
            }
            node.position = change.position;
            node.data.is_dirty = true;
            if let Some(step) = self.flow.step_mut(&change.id) {
                step.position = Some(change.position);
            }
            moved = true;
        }
        if moved {
            self.dirty = true;
            debug!(count = changes.len(), "applied position changes");
        }
    }

    /// Removes edges and translates each removal into the deletion of the
    /// underlying reference: a default edge clears the source's default
    /// transition, a conditional edge removes the transition matched by
    /// target. Fallback and branch edges disappear visually only; their
    /// references are owned by step updates and deletions.
    pub fn apply_edge_removals(&mut self, edge_ids: &[String]) {
        let mut modified: Vec<String> = Vec::new();
        for edge_id in edge_ids {
            let Some(index) = self.edges.iter().position(|e| e.id == *edge_id) else {
                continue;
            };
            let edge = self.edges.remove(index);
            let Some(step) = self.flow.step_mut(&edge.source) else {
                continue;
            };
            match edge.kind {
                EdgeKind::Default => {
                    if step.default_next_step_instance_id.as_deref() == Some(&edge.target) {
                        step.default_next_step_instance_id = None;
                        modified.push(edge.source.clone());
                    }
                }
                EdgeKind::Conditional => {
                    let before = step.transitions.len();
                    step.transitions
                        .retain(|t| t.next_step_instance_id != edge.target);
                    if step.transitions.len() != before {
                        modified.push(edge.source.clone());
                    }
                }
                EdgeKind::Fallback | EdgeKind::Branch => {}
            }
        }
        if modified.is_empty() {
            return;
        }
        for id in &modified {
            self.mark_node_dirty(id);
        }
        self.dirty = true;
        self.refresh_annotations();
        debug!(count = modified.len(), "removed edges");
    }

    /// Connects two steps. The first connection from a step becomes its
    /// default transition; every subsequent one is appended as a
    /// conditional transition with a placeholder condition. No-op for
    /// self-loops, unknown ids, and targets the step already connects to.
    pub fn connect(
        &mut self,
        source_id: &str,
        target_id: &str,
        source_handle: Anchor,
        target_handle: Anchor,
    ) {
        if source_id == target_id
            || !self.flow.steps.contains_key(target_id)
        {
            return;
        }
        let Some(step) = self.flow.step_mut(source_id) else {
            return;
        };
        let already_connected = step.default_next_step_instance_id.as_deref() == Some(target_id)
            || step
                .transitions
                .iter()
                .any(|t| t.next_step_instance_id == target_id);
        if already_connected {
            return;
        }

        let kind = if step.default_next_step_instance_id.is_none() {
            step.default_next_step_instance_id = Some(target_id.to_string());
            EdgeKind::Default
        } else {
            step.transitions.push(Transition {
                condition: PLACEHOLDER_CONDITION.to_string(),
                next_step_instance_id: target_id.to_string(),
            });
            EdgeKind::Conditional
        };
        self.edges.push(
            GraphEdge::new(kind, source_id, target_id).with_handles(source_handle, target_handle),
        );
        self.mark_node_dirty(source_id);
        self.dirty = true;
        self.refresh_annotations();
        debug!(
            source = source_id,
            target = target_id,
            kind = kind.as_str(),
            "connected steps"
        );
    }

    /// Renames a step and rewrites every occurrence of the old id in one
    /// atomic pass: the steps-map key, the step's own id, the start-step
    /// reference, every outgoing relation of every other step, the visual
    /// node, and all touching edges. No-op for empty, unchanged, unknown
    /// or already-taken ids.
    pub fn rename_step(&mut self, old_id: &str, new_id: &str) {
        if new_id.is_empty() || new_id == old_id || self.flow.steps.contains_key(new_id) {
            return;
        }
        let Some(mut step) = self.flow.steps.remove(old_id) else {
            return;
        };
        step.step_instance_id = new_id.to_string();
        self.flow.steps.insert(new_id.to_string(), step);

        if self.flow.start_step_instance_id == old_id {
            self.flow.start_step_instance_id = new_id.to_string();
        }
        for other in self.flow.steps.values_mut() {
            other.rewrite_references(old_id, new_id);
        }
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == old_id) {
            node.id = new_id.to_string();
        }
        for edge in &mut self.edges {
            if edge.source == old_id {
                edge.source = new_id.to_string();
            }
            if edge.target == old_id {
                edge.target = new_id.to_string();
            }
            edge.id = edge_id(edge.kind, &edge.source, &edge.target);
        }
        self.mark_node_dirty(new_id);
        self.dirty = true;
        self.refresh_annotations();
        debug!(old = old_id, new = new_id, "renamed step");
    }

    /// Applies a typed partial update to a step. When the update changes
    /// the default transition, error policy or branch set, the step's
    /// outgoing edges are rebuilt from the definition so the at-most-one
    /// default edge invariant holds without the caller managing edges.
    /// Fields that would introduce a dangling reference are skipped.
    pub fn update_step(&mut self, id: &str, patch: StepPatch) {
        if patch.is_empty() || !self.flow.steps.contains_key(id) {
            return;
        }

        let exists = |target: &str| self.flow.steps.contains_key(target);
        let default_ok = match &patch.default_next_step_instance_id {
            Some(Some(target)) => exists(target),
            _ => true,
        };
        let on_error_ok = match &patch.on_error {
            Some(Some(policy)) => policy
                .fallback_step_instance_id
                .as_deref()
                .is_none_or(|target| exists(target)),
            _ => true,
        };
        let config_ok = match &patch.config {
            Some(config) => config.branches().iter().all(|b| {
                b.step_instance_id
                    .as_deref()
                    .is_none_or(|entry| exists(entry))
            }),
            None => true,
        };

        let Some(step) = self.flow.step_mut(id) else {
            return;
        };
        let mut changed = false;
        let mut relations_changed = false;
        if let Some(name) = patch.display_name {
            if step.display_name != name {
                step.display_name = name;
                changed = true;
            }
        }
        if let Some(next) = patch.default_next_step_instance_id {
            if default_ok && step.default_next_step_instance_id != next {
                step.default_next_step_instance_id = next;
                changed = true;
                relations_changed = true;
            }
        }
        if let Some(policy) = patch.on_error {
            if on_error_ok && step.on_error != policy {
                step.on_error = policy;
                changed = true;
                relations_changed = true;
            }
        }
        if let Some(config) = patch.config {
            if config_ok && step.config != config {
                step.config = config;
                changed = true;
                relations_changed = true;
            }
        }
        if !changed {
            return;
        }

        if relations_changed {
            self.rebuild_edges_for_source(id);
        }
        self.mark_node_dirty(id);
        self.dirty = true;
        self.refresh_annotations();
        debug!(step = id, "updated step");
    }

    /// Creates a step and its node from a template at the given position,
    /// under a fresh collision-resistant id derived from the step type.
    /// No relations are auto-created for the new step. Returns the id.
    pub fn add_node(&mut self, template: &NodeTemplate, position: Position) -> String {
        let id = self.generate_step_id(template.config.id_prefix());
        let mut step = StepInstance::new(id.clone(), template.config.clone());
        if !template.display_name.is_empty() {
            step.display_name = template.display_name.clone();
        }
        step.position = Some(position);
        self.flow.steps.insert(id.clone(), step);

        let step = &self.flow.steps[&id];
        self.nodes.push(GraphNode::new(
            id.clone(),
            position,
            NodeData {
                display_name: step.display_name.clone(),
                step_type: step.step_type().to_string(),
                is_start: false,
                is_dirty: true,
                branch: None,
                is_branch_end: false,
                is_terminal: step.is_terminal(),
            },
        ));
        self.dirty = true;
        debug!(step = id.as_str(), "added step");
        id
    }

    /// Deletes steps, their nodes and every touching edge, then clears all
    /// surviving references to the deleted ids (default transitions,
    /// conditional transitions, fallbacks, branch entries, the start
    /// step). No dangling reference survives.
    pub fn delete_nodes(&mut self, ids: &[String]) {
        let deleted: AHashSet<String> = ids
            .iter()
            .filter(|id| self.flow.steps.contains_key(*id))
            .cloned()
            .collect();
        if deleted.is_empty() {
            return;
        }
        for id in &deleted {
            self.flow.steps.remove(id);
        }
        if deleted.contains(&self.flow.start_step_instance_id) {
            self.flow.start_step_instance_id = String::new();
        }
        let mut modified: Vec<String> = Vec::new();
        for step in self.flow.steps.values_mut() {
            if step.clear_references_to(&deleted) {
                modified.push(step.step_instance_id.clone());
            }
        }
        self.nodes.retain(|n| !deleted.contains(&n.id));
        self.edges
            .retain(|e| !deleted.contains(&e.source) && !deleted.contains(&e.target));
        for id in &modified {
            self.mark_node_dirty(id);
        }
        self.dirty = true;
        self.refresh_annotations();
        debug!(count = deleted.len(), "deleted steps");
    }

    /// Rewrites the condition of the transition behind a conditional edge,
    /// located via the edge's (source, target) pair. No-op for unknown
    /// edges and for edges of any other kind.
    pub fn update_edge_condition(&mut self, edge_id: &str, condition: &str) {
        let Some(edge) = self.edges.iter().find(|e| e.id == edge_id) else {
            return;
        };
        if edge.kind != EdgeKind::Conditional {
            return;
        }
        let (source, target) = (edge.source.clone(), edge.target.clone());
        let Some(step) = self.flow.step_mut(&source) else {
            return;
        };
        let Some(transition) = step
            .transitions
            .iter_mut()
            .find(|t| t.next_step_instance_id == target)
        else {
            return;
        };
        if transition.condition == condition {
            return;
        }
        transition.condition = condition.to_string();
        self.mark_node_dirty(&source);
        self.dirty = true;
        debug!(source = source.as_str(), target = target.as_str(), "updated edge condition");
    }

    /// Makes a step the flow's entry point and refreshes the start flag on
    /// every node so exactly one carries it. No-op when the step is
    /// unknown or already the start.
    pub fn set_start_node(&mut self, id: &str) {
        if self.flow.start_step_instance_id == id || !self.flow.steps.contains_key(id) {
            return;
        }
        self.flow.start_step_instance_id = id.to_string();
        for node in &mut self.nodes {
            node.data.is_start = node.id == id;
        }
        self.dirty = true;
        debug!(step = id, "set start step");
    }

    /// Clears the session and per-node dirty flags. Called by the owner
    /// after the save service reports success, never inferred.
    pub fn clear_dirty_state(&mut self) {
        self.dirty = false;
        for node in &mut self.nodes {
            node.data.is_dirty = false;
        }
    }

    fn mark_node_dirty(&mut self, id: &str) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.data.is_dirty = true;
        }
    }

    /// Replaces all edges leaving `source` with edges freshly derived from
    /// the definition, carrying over pinned handles where the relation
    /// survived.
    fn rebuild_edges_for_source(&mut self, source: &str) {
        let pinned: AHashMap<String, (Option<Anchor>, Option<Anchor>)> = self
            .edges
            .iter()
            .filter(|e| e.source == source)
            .map(|e| (e.id.clone(), (e.source_handle, e.target_handle)))
            .collect();
        self.edges.retain(|e| e.source != source);
        let Some(step) = self.flow.step(source) else {
            return;
        };
        for mut edge in edges_for_step(step) {
            if let Some((source_handle, target_handle)) = pinned.get(&edge.id) {
                edge.source_handle = *source_handle;
                edge.target_handle = *target_handle;
            }
            self.edges.push(edge);
        }
    }

    /// Recomputes the presentation annotations that are pure functions of
    /// the definition: branch badges, branch ends, start flag, terminal
    /// flag, display names. Called after every structural mutation.
    fn refresh_annotations(&mut self) {
        let membership = resolve_branch_membership(&self.flow);
        for node in &mut self.nodes {
            let Some(step) = self.flow.steps.get(&node.id) else {
                continue;
            };
            node.data.display_name = step.display_name.clone();
            node.data.step_type = step.step_type().to_string();
            node.data.is_start = self.flow.start_step_instance_id == node.id;
            node.data.is_terminal = step.is_terminal();
            node.data.branch = membership.label(&node.id).cloned();
            node.data.is_branch_end = membership.is_branch_end(&node.id);
        }
    }

    fn generate_step_id(&self, prefix: &str) -> String {
        loop {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            let id = format!("{}_{}", prefix, &suffix[..8]);
            if !self.flow.steps.contains_key(&id) {
                return id;
            }
        }
    }
}
