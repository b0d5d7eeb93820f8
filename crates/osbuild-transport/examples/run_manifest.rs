//! Run a manifest file through osbuild
//!
//! Reads a manifest from disk, runs the engine against the given store and
//! output directory, and prints the build result as JSON. The engine's own
//! log output is forwarded to stderr as it is produced.
//!
//! ## Configuration
//!
//! - `OSBUILD_PROGRAM`: engine executable (default: `osbuild`)
//! - `OSBUILD_EXTRA_ARGS`: extra engine arguments, whitespace separated
//! - `RUST_LOG`: log filter, e.g. `osbuild_transport=debug`
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example run_manifest -- manifest.json /var/cache/osbuild ./output
//! ```

use osbuild_protocol::Manifest;
use osbuild_transport::{EngineConfig, Invoker};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(manifest_path), Some(store), Some(output_directory)) =
        (args.next(), args.next(), args.next())
    else {
        eprintln!("usage: run_manifest <manifest.json> <store> <output-directory>");
        return Ok(ExitCode::from(2));
    };

    let manifest = Manifest::from_slice(&tokio::fs::read(&manifest_path).await?)?;
    let invoker = Invoker::new(EngineConfig::from_env());
    let mut diagnostics = tokio::io::stderr();

    let outcome = invoker
        .invoke(
            &manifest,
            PathBuf::from(store),
            PathBuf::from(output_directory),
            &mut diagnostics,
        )
        .await;

    match outcome {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("error: {err}");
            if let Some(partial) = err.result() {
                if let Some(stage) = partial.failed_stage() {
                    eprintln!("failed stage: {}", stage.name());
                }
                println!("{}", serde_json::to_string_pretty(partial)?);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
