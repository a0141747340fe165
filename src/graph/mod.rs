//! Visual node/edge collections derived from a flow definition.
//!
//! These types are what the rendering surface consumes. They are ephemeral:
//! regenerated from the canonical `FlowDefinition` on load and kept in step
//! with it by the store. Only `position` flows back into the definition.

pub mod branches;
pub mod convert;
mod layout;

pub use branches::*;
pub use convert::*;

use crate::geometry::{Anchor, NODE_HEIGHT, NODE_WIDTH};
use serde::{Deserialize, Serialize};

use crate::flow::Position;

/// The visual counterpart of one step instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Equal to the step's `step_instance_id`.
    pub id: String,
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub data: NodeData,
}

/// Presentation flags carried by a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub display_name: String,
    pub step_type: String,
    pub is_start: bool,
    /// Unsaved local edits touch this node. Cleared on successful save.
    pub is_dirty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchLabel>,
    pub is_branch_end: bool,
    pub is_terminal: bool,
}

/// Identifies the parallel branch a step belongs to, for badges and
/// end-of-branch markers. Purely presentational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchLabel {
    /// The fork-manager step that owns the branch.
    pub fork_id: String,
    pub branch_id: String,
}

/// A visual edge. Never independently authoritative: each edge exists
/// purely as a function of one outgoing-relation field on its source step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<Anchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<Anchor>,
}

/// The source relationship an edge visualizes. Exactly one edge per
/// relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// From `default_next_step_instance_id`.
    Default,
    /// One per conditional transition.
    Conditional,
    /// From `on_error.fallback_step_instance_id`.
    Fallback,
    /// From a fork manager to a branch's entry step.
    Branch,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Default => "default",
            EdgeKind::Conditional => "conditional",
            EdgeKind::Fallback => "fallback",
            EdgeKind::Branch => "branch",
        }
    }
}

impl GraphNode {
    pub fn new(id: impl Into<String>, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position,
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
            data,
        }
    }
}

impl GraphEdge {
    /// Builds an edge with its deterministic id. Handles start unset; the
    /// renderer picks them per frame, and connect gestures pin them.
    pub fn new(kind: EdgeKind, source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(kind, &source, &target),
            source,
            target,
            kind,
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_handles(mut self, source_handle: Anchor, target_handle: Anchor) -> Self {
        self.source_handle = Some(source_handle);
        self.target_handle = Some(target_handle);
        self
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

/// The deterministic edge id for a (kind, source, target) relationship.
pub fn edge_id(kind: EdgeKind, source: &str, target: &str) -> String {
    format!("{}:{}->{}", kind.as_str(), source, target)
}
