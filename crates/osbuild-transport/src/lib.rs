//! Subprocess transport for the osbuild build engine
//!
//! Runs `osbuild` as a child process, hands it a manifest on stdin and reads
//! back its build result from stdout, while forwarding stderr untouched to
//! a caller-supplied sink.
//!
//! # Architecture
//!
//! - **Invoker**: one engine process per call, all three streams pumped concurrently
//! - **EngineConfig**: executable, extra arguments and environment for the engine

#![deny(unsafe_code)]
#![warn(missing_docs)]
//! - **BuildEngine trait**: object-safe seam for substituting engines
//! - **Error handling**: [`InvokeError`] separates transport, encoding,
//!   decoding and engine failures, and keeps partial results
//!
//! # Usage
//!
//! ```no_run
//! use osbuild_protocol::Manifest;
//! use osbuild_transport::{EngineConfig, Invoker};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = Manifest::from_json_str(r#"{"pipeline": {}}"#)?;
//! let invoker = Invoker::new(EngineConfig::from_env());
//! let mut stderr = tokio::io::stderr();
//!
//! match invoker.invoke(&manifest, "/var/cache/osbuild", "/tmp/out", &mut stderr).await {
//!     Ok(result) => println!("built {} stages", result.stages.len()),
//!     Err(err) => match err.result() {
//!         Some(partial) => eprintln!("{err}; failed at {:?}", partial.failed_stage()),
//!         None => eprintln!("{err}"),
//!     },
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod subprocess;
pub mod traits;

// Re-export commonly used types
pub use error::{Channel, ErrorKind, InvokeError, Result};
pub use subprocess::{EngineConfig, Invoker, run_osbuild};
pub use traits::{BuildEngine, DiagnosticSink};
