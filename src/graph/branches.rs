use crate::flow::FlowDefinition;
use crate::graph::BranchLabel;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::VecDeque;

/// The branch labeling of a flow: which steps sit inside which parallel
/// branch, and which of them are branch ends.
///
/// Used only for presentation (branch badges, return markers); the
/// canonical definition is never affected by this labeling.
#[derive(Debug, Clone, Default)]
pub struct BranchMembership {
    labels: AHashMap<String, BranchLabel>,
    ends: AHashSet<String>,
}

impl BranchMembership {
    pub fn label(&self, step_id: &str) -> Option<&BranchLabel> {
        self.labels.get(step_id)
    }

    pub fn is_branch_end(&self, step_id: &str) -> bool {
        self.ends.contains(step_id)
    }
}

/// Labels every step reachable from a fork manager's branch entry points.
///
/// For each branch with an entry step, walks the happy path (the default
/// transition plus every conditional transition) breadth-first, tagging
/// visited steps with `(fork_id, branch_id)`. The walk stops at steps that
/// are already labeled (cross-branch reconvergence) and at references to
/// unknown steps.
pub fn resolve_branch_membership(flow: &FlowDefinition) -> BranchMembership {
    let mut labels: AHashMap<String, BranchLabel> = AHashMap::new();

    // Fork order is fixed by id so reconvergent steps always land in the
    // same branch across runs.
    let fork_ids = flow
        .steps
        .values()
        .filter(|s| s.config.is_fork_manager())
        .map(|s| s.step_instance_id.clone())
        .sorted()
        .collect::<Vec<_>>();

    for fork_id in fork_ids {
        let Some(fork) = flow.step(&fork_id) else {
            continue;
        };
        for branch in fork.branches() {
            let Some(entry) = &branch.step_instance_id else {
                continue;
            };
            let mut queue = VecDeque::from([entry.clone()]);
            while let Some(step_id) = queue.pop_front() {
                if labels.contains_key(&step_id) {
                    continue;
                }
                let Some(step) = flow.step(&step_id) else {
                    continue;
                };
                labels.insert(
                    step_id,
                    BranchLabel {
                        fork_id: fork_id.clone(),
                        branch_id: branch.branch_id.clone(),
                    },
                );
                if let Some(next) = &step.default_next_step_instance_id {
                    queue.push_back(next.clone());
                }
                for transition in &step.transitions {
                    queue.push_back(transition.next_step_instance_id.clone());
                }
            }
        }
    }

    // A branch end is a labeled step with nowhere to go that does not end
    // the flow itself.
    let ends = labels
        .keys()
        .filter(|id| {
            flow.step(id).is_some_and(|step| {
                step.default_next_step_instance_id.is_none() && !step.is_terminal()
            })
        })
        .cloned()
        .collect();

    BranchMembership { labels, ends }
}
