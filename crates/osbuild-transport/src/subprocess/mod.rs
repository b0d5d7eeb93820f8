//! Subprocess invocation of the build engine
//!
//! Implements the stdin/stdout JSON exchange with the osbuild executable
//! and the passthrough of its stderr.

pub mod config;
pub mod invoker;
mod pipes;

pub use config::EngineConfig;
pub use invoker::{Invoker, run_osbuild};
