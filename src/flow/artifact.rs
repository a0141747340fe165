use super::definition::FlowDefinition;
use crate::error::ArtifactError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

impl FlowDefinition {
    /// Serializes the definition to the persisted JSON interchange format.
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ArtifactError::Encode(format!("JSON serialization failed: {}", e)))
    }

    /// Parses a definition from the persisted JSON interchange format.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        serde_json::from_str(json)
            .map_err(|e| ArtifactError::Decode(format!("JSON parsing failed: {}", e)))
    }
}

/// A binary snapshot of an editing session's definition plus metadata,
/// used for local crash-recovery autosaves. The JSON interchange format
/// stays the contract with the flow service; snapshots never leave the
/// local machine.
#[derive(Serialize, Deserialize, Debug)]
pub struct FlowSnapshot {
    pub name: String,
    pub description: String,
    pub definition: FlowDefinition,
}

impl FlowSnapshot {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        definition: FlowDefinition,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            definition,
        }
    }

    /// Saves the snapshot to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), ArtifactError> {
        let bytes = encode_to_vec(self, standard())
            .map_err(|e| ArtifactError::Encode(format!("Serialization failed: {}", e)))?;
        let mut file = fs::File::create(path)
            .map_err(|e| ArtifactError::Io(format!("Could not create file '{}': {}", path, e)))?;
        file.write_all(&bytes)
            .map_err(|e| ArtifactError::Io(format!("Could not write to file '{}': {}", path, e)))?;
        Ok(())
    }

    /// Loads a snapshot from a file.
    pub fn from_file(path: &str) -> Result<Self, ArtifactError> {
        let mut file = fs::File::open(path)
            .map_err(|e| ArtifactError::Io(format!("Could not open file '{}': {}", path, e)))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| ArtifactError::Io(format!("Could not read from file '{}': {}", path, e)))?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes a snapshot from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        decode_from_slice(bytes, standard())
            .map(|(snapshot, _)| snapshot) // bincode 2 returns a tuple (data, bytes_read)
            .map_err(|e| ArtifactError::Decode(format!("Deserialization failed: {}", e)))
    }
}
