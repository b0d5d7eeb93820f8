//! Data model for talking to the osbuild build engine
//!
//! This crate holds the values that cross the process boundary when a build
//! is run: the manifest written to the engine's stdin and the result record
//! read back from its stdout. It is shared by the invoker in
//! `osbuild-transport` and by anything that builds manifests or consumes
//! results.
//!
//! # Type Organization
//!
//! - **Manifest**: [`manifest`] - opaque pipeline description handed to the engine
//! - **Results**: [`result`] - build result record and per-stage outcomes
//! - **Error types**: [`error`] - parse errors for the above
//!
//! # Design Principles
//!
//! - **Zero I/O**: all types are pure data structures
//! - **Pass-through**: fields this crate does not model are kept verbatim

#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! # Usage
//!
//! ```
//! use osbuild_protocol::{BuildResult, Manifest};
//!
//! let manifest = Manifest::from_json_str(r#"{"pipeline": {"stages": []}}"#).unwrap();
//! assert!(manifest.as_value().is_object());
//!
//! let result = BuildResult::from_json_str(r#"{"success": true, "stages": ["a", "b"]}"#).unwrap();
//! assert_eq!(result.stage_names(), vec!["a", "b"]);
//! ```

pub mod error;
pub mod manifest;
pub mod result;

pub use error::{ProtocolError, Result};
pub use manifest::Manifest;
pub use result::{BuildResult, StageOutcome, StageResult};
