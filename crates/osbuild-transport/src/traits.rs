//! Build engine trait
//!
//! Defines the object-safe seam between callers that need a build run and
//! the mechanism that runs it. [`Invoker`](crate::Invoker) is the subprocess
//! implementation.

use crate::error::Result;
use crate::subprocess::Invoker;
use async_trait::async_trait;
use osbuild_protocol::{BuildResult, Manifest};
use std::path::Path;
use tokio::io::AsyncWrite;

/// Destination for the engine's free-form diagnostic output
pub type DiagnosticSink = dyn AsyncWrite + Unpin + Send;

/// Something that can run a manifest to a build result
#[async_trait]
pub trait BuildEngine: Send + Sync {
    /// Build `manifest` using `store` as the cache and writing artifacts
    /// to `output_directory`
    ///
    /// # Errors
    ///
    /// See [`InvokeError`](crate::InvokeError) for the failure categories.
    async fn build(
        &self,
        manifest: &Manifest,
        store: &Path,
        output_directory: &Path,
        diagnostics: &mut DiagnosticSink,
    ) -> Result<BuildResult>;
}

#[async_trait]
impl BuildEngine for Invoker {
    async fn build(
        &self,
        manifest: &Manifest,
        store: &Path,
        output_directory: &Path,
        diagnostics: &mut DiagnosticSink,
    ) -> Result<BuildResult> {
        self.invoke(manifest, store, output_directory, diagnostics)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoker_is_object_safe_engine() {
        let engine: Box<dyn BuildEngine> = Box::new(Invoker::default());
        let _ = &engine;
    }
}
