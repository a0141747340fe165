use crate::flow::definition::Branch;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Step-type specific configuration, tagged by `stepType` on the wire.
///
/// Modeling this as a sum type keeps the outgoing-relation fields of
/// `StepInstance` (default transition, conditional transitions, branches)
/// independent of each type's payload shape: reference integrity can be
/// enforced without knowing what a task or prompt payload looks like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stepType", rename_all = "camelCase")]
pub enum StepConfig {
    /// A generic unit of work. The payload is opaque to the editor.
    Task(TaskConfig),
    /// Spawns parallel sub-paths, each optionally anchored to an entry step.
    ForkManager(ForkConfig),
    /// Ends the flow. Terminal steps host no outgoing connections.
    Terminate(TerminateConfig),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "ahashmap_is_empty")]
    pub parameters: AHashMap<String, serde_json::Value>,
}

/// `AHashMap::is_empty` is reachable only through `Deref` to `HashMap`, so it
/// can't be named as a path in `skip_serializing_if`; this wrapper provides one.
fn ahashmap_is_empty<K, V>(map: &AHashMap<K, V>) -> bool {
    map.is_empty()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parallel_branches: Vec<Branch>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl Default for StepConfig {
    fn default() -> Self {
        StepConfig::Task(TaskConfig::default())
    }
}

impl StepConfig {
    /// The wire name of this type (the value of the `stepType` tag).
    pub fn step_type(&self) -> &'static str {
        match self {
            StepConfig::Task(_) => "task",
            StepConfig::ForkManager(_) => "forkManager",
            StepConfig::Terminate(_) => "terminate",
        }
    }

    /// Short slug used when deriving fresh step instance ids.
    pub(crate) fn id_prefix(&self) -> &'static str {
        match self {
            StepConfig::Task(_) => "task",
            StepConfig::ForkManager(_) => "fork",
            StepConfig::Terminate(_) => "terminate",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StepConfig::Terminate(_))
    }

    pub fn is_fork_manager(&self) -> bool {
        matches!(self, StepConfig::ForkManager(_))
    }

    pub fn branches(&self) -> &[Branch] {
        match self {
            StepConfig::ForkManager(fork) => &fork.parallel_branches,
            _ => &[],
        }
    }

    pub fn branches_mut(&mut self) -> &mut [Branch] {
        match self {
            StepConfig::ForkManager(fork) => &mut fork.parallel_branches,
            _ => &mut [],
        }
    }
}
