//! Build manifest
//!
//! The manifest is produced by an external collaborator (distro image
//! definitions) and only travels through this workspace. It is kept as a
//! JSON value and serialized exactly as received.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Opaque description of an osbuild pipeline.
///
/// Serializes transparently, so a `Manifest` wrapping `{"pipeline": ...}`
/// is written to the engine as `{"pipeline": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(serde_json::Value);

impl Manifest {
    /// Wrap an already-built JSON value
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Parse a manifest from JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not valid JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(json)?))
    }

    /// Parse a manifest from raw JSON bytes
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not valid JSON
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }

    /// Borrow the underlying JSON value
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consume the manifest and return the underlying JSON value
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for Manifest {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
