//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the keiro crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.

// The editing-session store and its gesture payloads
pub use crate::store::{
    EditorStore, FlowMetadata, NodeTemplate, PLACEHOLDER_CONDITION, PositionChange, StepPatch,
};

// Canonical flow schema
pub use crate::flow::{
    Branch, ErrorPolicy, FlowDefinition, FlowSnapshot, ForkConfig, IntoFlow, LoadedFlow, Position,
    StepConfig, StepInstance, TaskConfig, TerminateConfig, Transition,
};

// Visual collections and derivations
pub use crate::graph::{
    BranchLabel, BranchMembership, EdgeKind, GraphConversion, GraphEdge, GraphNode, NodeData,
    flow_to_graph, resolve_branch_membership,
};

// Anchor geometry
pub use crate::geometry::{
    Anchor, NODE_HEIGHT, NODE_WIDTH, anchor_pair_for_new_connection, anchor_pair_for_render,
};

// Error types
pub use crate::error::{ArtifactError, FlowConversionError, FlowValidationError};
