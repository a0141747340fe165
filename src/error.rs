use thiserror::Error;

/// Errors found when checking the structural reference invariants of a
/// persisted flow definition at the load boundary.
#[derive(Error, Debug, Clone)]
pub enum FlowValidationError {
    #[error("Steps map key '{key}' does not match the contained step's id '{step_instance_id}'")]
    KeyMismatch {
        key: String,
        step_instance_id: String,
    },

    #[error("Start step '{start_step_instance_id}' is not present in the flow")]
    StartStepNotFound { start_step_instance_id: String },

    #[error("Step '{step_id}' references unknown step '{target}' via {field}")]
    DanglingReference {
        step_id: String,
        field: String,
        target: String,
    },
}

/// Errors that can occur when converting a custom wire format into a
/// canonical `LoadedFlow`.
#[derive(Error, Debug, Clone)]
pub enum FlowConversionError {
    #[error("Invalid flow record: {0}")]
    Validation(String),
}

/// Errors that can occur while reading or writing flow artifacts
/// (JSON interchange documents and binary session snapshots).
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Encode(String),

    #[error("{0}")]
    Decode(String),
}
