use crate::error::FlowValidationError;
use crate::flow::config::StepConfig;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

/// The complete, canonical definition of a workflow, as persisted by the
/// flow service. This is the single source of truth while a flow is being
/// edited; the visual node/edge collections are derived from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDefinition {
    pub id: String,
    pub version: u32,
    pub is_published: bool,
    /// Entry step of the flow. Empty when no start step has been chosen yet.
    #[serde(default)]
    pub start_step_instance_id: String,
    #[serde(default)]
    pub steps: AHashMap<String, StepInstance>,
}

/// A single unit of work in a flow: a typed step plus its outgoing relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInstance {
    pub step_instance_id: String,
    pub display_name: String,
    /// Diagram position. Absent until the first layout has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// The unconditional "next step" relation. At most one per step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_next_step_instance_id: Option<String>,
    /// Condition-guarded outgoing relations, evaluated after the default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<ErrorPolicy>,
    /// Step-type specific configuration, keyed by `stepType` on the wire.
    #[serde(flatten)]
    pub config: StepConfig,
}

/// A diagram coordinate, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A condition-guarded transition to another step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub condition: String,
    pub next_step_instance_id: String,
}

/// Error handling policy for a step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_step_instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

/// One parallel branch of a fork-manager step. A branch without an entry
/// step is inline/foreign and contributes no graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub branch_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_instance_id: Option<String>,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl StepInstance {
    pub fn new(step_instance_id: impl Into<String>, config: StepConfig) -> Self {
        let step_instance_id = step_instance_id.into();
        Self {
            display_name: step_instance_id.clone(),
            step_instance_id,
            position: None,
            default_next_step_instance_id: None,
            transitions: Vec::new(),
            on_error: None,
            config,
        }
    }

    /// The wire name of this step's type (the `stepType` tag).
    pub fn step_type(&self) -> &'static str {
        self.config.step_type()
    }

    /// Terminal steps end the flow and host no outgoing connections.
    pub fn is_terminal(&self) -> bool {
        self.config.is_terminal()
    }

    /// The parallel branches of a fork manager; empty for any other type.
    pub fn branches(&self) -> &[Branch] {
        self.config.branches()
    }

    pub fn branches_mut(&mut self) -> &mut [Branch] {
        self.config.branches_mut()
    }

    /// Whether any outgoing relation of this step references `id`.
    pub fn references(&self, id: &str) -> bool {
        self.default_next_step_instance_id.as_deref() == Some(id)
            || self
                .transitions
                .iter()
                .any(|t| t.next_step_instance_id == id)
            || self
                .on_error
                .as_ref()
                .is_some_and(|p| p.fallback_step_instance_id.as_deref() == Some(id))
            || self
                .branches()
                .iter()
                .any(|b| b.step_instance_id.as_deref() == Some(id))
    }

    /// Rewrites every outgoing relation equal to `old` to point at `new`.
    /// Returns whether anything changed.
    pub(crate) fn rewrite_references(&mut self, old: &str, new: &str) -> bool {
        let mut changed = false;
        if self.default_next_step_instance_id.as_deref() == Some(old) {
            self.default_next_step_instance_id = Some(new.to_string());
            changed = true;
        }
        for transition in &mut self.transitions {
            if transition.next_step_instance_id == old {
                transition.next_step_instance_id = new.to_string();
                changed = true;
            }
        }
        if let Some(policy) = &mut self.on_error {
            if policy.fallback_step_instance_id.as_deref() == Some(old) {
                policy.fallback_step_instance_id = Some(new.to_string());
                changed = true;
            }
        }
        for branch in self.branches_mut() {
            if branch.step_instance_id.as_deref() == Some(old) {
                branch.step_instance_id = Some(new.to_string());
                changed = true;
            }
        }
        changed
    }

    /// Drops every outgoing relation that points into `deleted`.
    /// Returns whether anything changed.
    pub(crate) fn clear_references_to(&mut self, deleted: &AHashSet<String>) -> bool {
        let mut changed = false;
        if self
            .default_next_step_instance_id
            .as_deref()
            .is_some_and(|id| deleted.contains(id))
        {
            self.default_next_step_instance_id = None;
            changed = true;
        }
        let before = self.transitions.len();
        self.transitions
            .retain(|t| !deleted.contains(&t.next_step_instance_id));
        changed |= self.transitions.len() != before;
        if let Some(policy) = &mut self.on_error {
            if policy
                .fallback_step_instance_id
                .as_deref()
                .is_some_and(|id| deleted.contains(id))
            {
                policy.fallback_step_instance_id = None;
                changed = true;
            }
        }
        for branch in self.branches_mut() {
            if branch
                .step_instance_id
                .as_deref()
                .is_some_and(|id| deleted.contains(id))
            {
                branch.step_instance_id = None;
                changed = true;
            }
        }
        changed
    }
}

impl FlowDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn step(&self, id: &str) -> Option<&StepInstance> {
        self.steps.get(id)
    }

    pub fn step_mut(&mut self, id: &str) -> Option<&mut StepInstance> {
        self.steps.get_mut(id)
    }

    /// Whether any step already carries a stored diagram position.
    /// Auto-layout only runs when this is false, so a user's manual
    /// arrangement survives repeated loads.
    pub fn any_position(&self) -> bool {
        self.steps.values().any(|s| s.position.is_some())
    }

    /// Checks the structural reference invariants of the persisted schema:
    /// map keys agree with each step's own id, the start step (when set)
    /// exists, and every outgoing relation points at an existing step.
    ///
    /// This belongs at the load boundary. The editor store preserves these
    /// invariants by construction and never needs to re-check them.
    pub fn validate_references(&self) -> Result<(), FlowValidationError> {
        for (key, step) in &self.steps {
            if *key != step.step_instance_id {
                return Err(FlowValidationError::KeyMismatch {
                    key: key.clone(),
                    step_instance_id: step.step_instance_id.clone(),
                });
            }
        }
        if !self.start_step_instance_id.is_empty()
            && !self.steps.contains_key(&self.start_step_instance_id)
        {
            return Err(FlowValidationError::StartStepNotFound {
                start_step_instance_id: self.start_step_instance_id.clone(),
            });
        }
        for step in self.steps.values() {
            let check = |field: &str, target: &str| {
                if self.steps.contains_key(target) {
                    Ok(())
                } else {
                    Err(FlowValidationError::DanglingReference {
                        step_id: step.step_instance_id.clone(),
                        field: field.to_string(),
                        target: target.to_string(),
                    })
                }
            };
            if let Some(next) = &step.default_next_step_instance_id {
                check("defaultNextStepInstanceId", next)?;
            }
            for transition in &step.transitions {
                check("transitions", &transition.next_step_instance_id)?;
            }
            if let Some(fallback) = step
                .on_error
                .as_ref()
                .and_then(|p| p.fallback_step_instance_id.as_ref())
            {
                check("onError.fallbackStepInstanceId", fallback)?;
            }
            for branch in step.branches() {
                if let Some(entry) = &branch.step_instance_id {
                    check("parallelBranches", entry)?;
                }
            }
        }
        Ok(())
    }
}
