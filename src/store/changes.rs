use crate::flow::{ErrorPolicy, Position, StepConfig};
use serde::{Deserialize, Serialize};

/// A node-moved gesture reported by the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionChange {
    pub id: String,
    pub position: Position,
}

/// Blueprint for a freshly added step: everything except the generated id
/// and the drop position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTemplate {
    pub display_name: String,
    #[serde(flatten)]
    pub config: StepConfig,
}

/// A typed partial update for one step instance.
///
/// `None` leaves a field untouched. The double-option fields distinguish
/// "leave unchanged" (`None`) from "clear" (`Some(None)`) from
/// "set" (`Some(Some(..))`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepPatch {
    pub display_name: Option<String>,
    pub default_next_step_instance_id: Option<Option<String>>,
    pub on_error: Option<Option<ErrorPolicy>>,
    pub config: Option<StepConfig>,
}

impl StepPatch {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.default_next_step_instance_id.is_none()
            && self.on_error.is_none()
            && self.config.is_none()
    }
}
