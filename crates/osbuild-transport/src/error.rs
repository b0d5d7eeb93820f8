//! Invocation error types
//!
//! Every way a build invocation can fail, grouped by [`ErrorKind`] so callers
//! can tell a broken environment from a broken manifest from a failed build.

use osbuild_protocol::BuildResult;
use std::fmt;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type for invocation operations
pub type Result<T> = std::result::Result<T, InvokeError>;

/// One of the child's standard streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Manifest input
    Stdin,
    /// Result output
    Stdout,
    /// Diagnostic text
    Stderr,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "stdin"),
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Broad category of an [`InvokeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The process or its streams could not be set up or driven
    TransportSetup,
    /// The manifest could not be serialized
    Encoding,
    /// The engine's output was not a well-formed result record
    Decoding,
    /// The engine failed and reported a (partial) result
    EngineFailureWithResult,
    /// The engine failed without producing a usable result
    EngineFailureWithoutResult,
}

/// Errors that can occur while running the build engine
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The engine process could not be started
    #[error("error starting {program}: {source}")]
    Spawn {
        /// Program that was executed
        program: String,
        /// Underlying OS error
        source: std::io::Error,
    },

    /// A standard stream of the child was not available
    #[error("error setting up {channel} for osbuild")]
    ChannelSetup {
        /// The missing stream
        channel: Channel,
    },

    /// The manifest could not be serialized
    #[error("error encoding osbuild pipeline: {0}")]
    Encode(#[source] serde_json::Error),

    /// The manifest could not be delivered to the engine
    #[error("error writing manifest to osbuild: {0}")]
    ManifestWrite(#[source] std::io::Error),

    /// Reading the engine's output failed
    #[error("error reading osbuild output: {0}")]
    OutputRead(#[source] std::io::Error),

    /// The engine exited successfully but its output was not a result record
    #[error("error decoding osbuild output ({output_len} bytes): {source}")]
    Decode {
        /// Parse error
        source: serde_json::Error,
        /// Number of bytes read from stdout
        output_len: usize,
    },

    /// Waiting for the engine to exit failed
    #[error("error waiting for osbuild: {0}")]
    Wait(#[source] std::io::Error),

    /// The engine exited unsuccessfully
    #[error("running osbuild failed: {status}")]
    Engine {
        /// Exit status of the engine
        status: ExitStatus,
        /// Result record, if one was decoded before the engine exited
        result: Option<Box<BuildResult>>,
        /// Why no record could be decoded from non-empty output
        #[source]
        decode: Option<serde_json::Error>,
    },
}

impl InvokeError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Spawn { .. }
            | Self::ChannelSetup { .. }
            | Self::ManifestWrite(_)
            | Self::OutputRead(_)
            | Self::Wait(_) => ErrorKind::TransportSetup,
            Self::Encode(_) => ErrorKind::Encoding,
            Self::Decode { .. } => ErrorKind::Decoding,
            Self::Engine { result: Some(_), .. } => ErrorKind::EngineFailureWithResult,
            Self::Engine { result: None, .. } => ErrorKind::EngineFailureWithoutResult,
        }
    }

    /// Whether the failure happened before a result could be received
    pub fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::TransportSetup | ErrorKind::Encoding)
    }

    /// Partial result reported by a failed build
    pub fn result(&self) -> Option<&BuildResult> {
        match self {
            Self::Engine { result, .. } => result.as_deref(),
            _ => None,
        }
    }

    /// Take the partial result reported by a failed build
    pub fn into_result(self) -> Option<BuildResult> {
        match self {
            Self::Engine { result, .. } => result.map(|result| *result),
            _ => None,
        }
    }

    /// Exit status of the engine, when it ran to completion
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            Self::Engine { status, .. } => Some(*status),
            _ => None,
        }
    }
}
