use crate::flow::{FlowDefinition, StepInstance};
use crate::graph::layout;
use crate::graph::{GraphEdge, GraphNode, NodeData};
use crate::graph::{EdgeKind, branches::resolve_branch_membership};
use itertools::Itertools;

/// The result of converting a flow definition into its visual collections.
///
/// `flow` is the definition the conversion was given, except that when no
/// step carried a position the one-time auto-layout has written freshly
/// assigned positions into it.
#[derive(Debug, Clone)]
pub struct GraphConversion {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub flow: FlowDefinition,
}

/// Derives the visual node/edge collections from a flow definition.
///
/// Pure and deterministic: nodes and edges come out sorted by id, and a
/// definition that already has positions converts to exactly the same
/// graph on every call. Auto-layout runs at most once, only when no step
/// has a stored position.
pub fn flow_to_graph(flow: &FlowDefinition) -> GraphConversion {
    let mut flow = flow.clone();
    let membership = resolve_branch_membership(&flow);

    let edges: Vec<GraphEdge> = flow
        .steps
        .values()
        .sorted_by(|a, b| a.step_instance_id.cmp(&b.step_instance_id))
        .flat_map(edges_for_step)
        .collect();

    if !flow.any_position() {
        layout::assign_positions(&mut flow, &edges);
    }

    let nodes: Vec<GraphNode> = flow
        .steps
        .values()
        .sorted_by(|a, b| a.step_instance_id.cmp(&b.step_instance_id))
        .map(|step| {
            let id = &step.step_instance_id;
            GraphNode::new(
                id.clone(),
                step.position.unwrap_or_default(),
                NodeData {
                    display_name: step.display_name.clone(),
                    step_type: step.step_type().to_string(),
                    is_start: flow.start_step_instance_id == *id,
                    is_dirty: false,
                    branch: membership.label(id).cloned(),
                    is_branch_end: membership.is_branch_end(id),
                    is_terminal: step.is_terminal(),
                },
            )
        })
        .collect();

    GraphConversion { nodes, edges, flow }
}

/// The edges a single step contributes, purely as a function of its
/// outgoing-relation fields.
pub(crate) fn edges_for_step(step: &StepInstance) -> Vec<GraphEdge> {
    let id = &step.step_instance_id;
    let mut edges: Vec<GraphEdge> = Vec::new();
    let mut push = |edge: GraphEdge| {
        if !edges.iter().any(|e| e.id == edge.id) {
            edges.push(edge);
        }
    };

    if let Some(next) = &step.default_next_step_instance_id {
        push(GraphEdge::new(EdgeKind::Default, id, next));
    }
    for transition in &step.transitions {
        push(GraphEdge::new(
            EdgeKind::Conditional,
            id,
            &transition.next_step_instance_id,
        ));
    }
    if let Some(fallback) = step
        .on_error
        .as_ref()
        .and_then(|p| p.fallback_step_instance_id.as_ref())
    {
        push(GraphEdge::new(EdgeKind::Fallback, id, fallback));
    }
    for branch in step.branches() {
        if let Some(entry) = &branch.step_instance_id {
            push(GraphEdge::new(EdgeKind::Branch, id, entry));
        }
    }
    edges
}
