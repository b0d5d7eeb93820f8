//! Build engine invocation
//!
//! Runs one engine process per call: the manifest goes in on stdin, one
//! result record comes back on stdout and stderr is passed through to a
//! caller-supplied sink.

use super::config::EngineConfig;
use super::pipes::{forward_diagnostics, read_output, write_manifest};
use crate::error::{Channel, InvokeError, Result};
use osbuild_protocol::BuildResult;
use serde::Serialize;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWrite;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tracing::{debug, info, instrument, warn};

/// Runs the build engine
///
/// Holds no per-invocation state, so one `Invoker` can serve any number of
/// concurrent builds.
#[derive(Clone, Debug, Default)]
pub struct Invoker {
    config: EngineConfig,
}

impl Invoker {
    /// Create an invoker with the given engine configuration
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one build.
    ///
    /// Spawns the engine with `--store <store> --output-directory
    /// <output_directory> --json -`, writes `manifest` to its stdin, reads
    /// one result record from its stdout and copies its stderr into
    /// `diagnostics`. The three streams are pumped concurrently, so large
    /// manifests cannot deadlock against an engine that starts writing
    /// early. The engine has exited and been reaped when this returns.
    ///
    /// There is no timeout. Dropping the returned future kills the engine.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::Encode`] if `manifest` cannot be serialized; the
    ///   engine is never started
    /// - [`InvokeError::Spawn`] / [`InvokeError::ChannelSetup`] if the
    ///   engine or its streams cannot be set up
    /// - [`InvokeError::Engine`] if the engine exits unsuccessfully, carrying
    ///   the partial result when one was decoded
    /// - [`InvokeError::Decode`] if the engine exits successfully but its
    ///   output is not exactly one result record
    #[instrument(name = "osbuild", skip_all, fields(program = %self.config.program))]
    pub async fn invoke<M, W>(
        &self,
        manifest: &M,
        store: impl AsRef<Path>,
        output_directory: impl AsRef<Path>,
        diagnostics: &mut W,
    ) -> Result<BuildResult>
    where
        M: Serialize + ?Sized,
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let payload = encode_manifest(manifest)?;

        let mut cmd = self
            .config
            .command(store.as_ref(), output_directory.as_ref());
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| InvokeError::Spawn {
            program: self.config.program.clone(),
            source,
        })?;
        info!(pid = ?child.id(), store = %store.as_ref().display(), "started osbuild");

        let (stdin, stdout, stderr) = match take_pipes(&mut child) {
            Ok(pipes) => pipes,
            Err(err) => {
                reap(&mut child).await;
                return Err(err);
            }
        };

        let (written, output, delivered) = tokio::join!(
            write_manifest(stdin, &payload),
            read_output(stdout),
            forward_diagnostics(stderr, diagnostics),
        );
        debug!(bytes = delivered, "diagnostics forwarded");

        let output = match output {
            Ok(output) => output,
            Err(err) => {
                reap(&mut child).await;
                return Err(InvokeError::OutputRead(err));
            }
        };

        let status = child.wait().await.map_err(InvokeError::Wait)?;
        let decoded = serde_json::from_slice::<BuildResult>(&output);

        if !status.success() {
            let (result, decode) = match decoded {
                Ok(result) => (Some(Box::new(result)), None),
                Err(_) if output.trim_ascii().is_empty() => (None, None),
                Err(err) => (None, Some(err)),
            };
            warn!(
                %status,
                partial_result = result.is_some(),
                "osbuild exited unsuccessfully"
            );
            return Err(InvokeError::Engine {
                status,
                result,
                decode,
            });
        }

        // The engine exited cleanly but did not take the whole manifest.
        written.map_err(InvokeError::ManifestWrite)?;

        let result = decoded.map_err(|source| InvokeError::Decode {
            source,
            output_len: output.len(),
        })?;
        info!(stages = result.stages.len(), success = result.success, "osbuild finished");

        Ok(result)
    }
}

/// Serialize the manifest the way the engine reads it: one JSON document
/// followed by a newline.
fn encode_manifest<M>(manifest: &M) -> Result<Vec<u8>>
where
    M: Serialize + ?Sized,
{
    let mut payload = serde_json::to_vec(manifest).map_err(InvokeError::Encode)?;
    payload.push(b'\n');
    Ok(payload)
}

fn take_pipes(child: &mut Child) -> Result<(ChildStdin, ChildStdout, ChildStderr)> {
    let stdin = child.stdin.take().ok_or(InvokeError::ChannelSetup {
        channel: Channel::Stdin,
    })?;
    let stdout = child.stdout.take().ok_or(InvokeError::ChannelSetup {
        channel: Channel::Stdout,
    })?;
    let stderr = child.stderr.take().ok_or(InvokeError::ChannelSetup {
        channel: Channel::Stderr,
    })?;
    Ok((stdin, stdout, stderr))
}

/// Kill the engine and wait for it, for early exits after a successful spawn
async fn reap(child: &mut Child) {
    if let Err(err) = child.kill().await {
        warn!(error = %err, pid = ?child.id(), "failed to kill osbuild");
    }
}

/// Run one build with the default engine configuration
///
/// See [`Invoker::invoke`].
pub async fn run_osbuild<M, W>(
    manifest: &M,
    store: impl AsRef<Path>,
    output_directory: impl AsRef<Path>,
    diagnostics: &mut W,
) -> Result<BuildResult>
where
    M: Serialize + ?Sized,
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    Invoker::default()
        .invoke(manifest, store, output_directory, diagnostics)
        .await
}
