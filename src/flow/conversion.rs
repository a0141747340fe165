use super::definition::FlowDefinition;
use crate::error::FlowConversionError;

/// A flow definition together with the metadata the loader supplies
/// alongside it. This is what an editing session is opened with.
#[derive(Debug, Clone, Default)]
pub struct LoadedFlow {
    pub definition: FlowDefinition,
    pub name: String,
    pub description: String,
}

impl LoadedFlow {
    pub fn new(
        definition: FlowDefinition,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            definition,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A trait for custom wire formats that can be converted into a canonical
/// `LoadedFlow`.
///
/// The editor core is transport-agnostic: whatever envelope the flow
/// service returns (a REST record, an export file, a fixture), implement
/// this trait on the parsed shape to provide the translation layer into
/// the canonical model.
///
/// # Example
///
/// ```rust,no_run
/// use keiro::prelude::*;
/// use keiro::error::FlowConversionError;
///
/// // 1. Define your struct for parsing the service's record format.
/// struct FlowRecord { name: String, definition_json: String }
///
/// // 2. Implement `IntoFlow` for it.
/// impl IntoFlow for FlowRecord {
///     fn into_flow(self) -> Result<LoadedFlow, FlowConversionError> {
///         let definition = FlowDefinition::from_json(&self.definition_json)
///             .map_err(|e| FlowConversionError::Validation(e.to_string()))?;
///         Ok(LoadedFlow::new(definition, self.name, ""))
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into a canonical `LoadedFlow`.
    fn into_flow(self) -> Result<LoadedFlow, FlowConversionError>;
}
