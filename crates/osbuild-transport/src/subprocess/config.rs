//! Engine process configuration

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Executable run when no other program is configured
pub const DEFAULT_PROGRAM: &str = "osbuild";

/// Environment variable overriding the engine executable
pub const PROGRAM_ENV: &str = "OSBUILD_PROGRAM";

/// Environment variable adding whitespace-separated engine arguments
pub const EXTRA_ARGS_ENV: &str = "OSBUILD_EXTRA_ARGS";

/// Configuration for spawning the build engine
///
/// Store and output locations are per-invocation and are not part of the
/// configuration; see [`EngineConfig::command_args`].
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Engine executable, resolved through `PATH` unless it is a path
    pub program: String,

    /// Arguments placed before the fixed protocol flags
    pub extra_args: Vec<String>,

    /// Environment variables added to the inherited environment
    pub env: HashMap<String, String>,

    /// Working directory of the engine
    pub current_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl EngineConfig {
    /// Create a configuration for the given executable
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            env: HashMap::new(),
            current_dir: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `OSBUILD_PROGRAM` for the engine executable
    /// - `OSBUILD_EXTRA_ARGS` for additional engine arguments
    pub fn from_env() -> Self {
        use std::env;

        let mut config = Self::default();

        if let Ok(program) = env::var(PROGRAM_ENV)
            && !program.trim().is_empty()
        {
            config.program = program.trim().to_string();
        }

        if let Ok(args) = env::var(EXTRA_ARGS_ENV) {
            config
                .extra_args
                .extend(args.split_whitespace().map(str::to_string));
        }

        config
    }

    /// Add an argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Set an environment variable for the engine
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the engine's working directory
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Full argument vector for one invocation.
    ///
    /// The trailing `--json -` tells the engine to read the manifest from
    /// stdin and to print its result as JSON.
    pub fn command_args(&self, store: &Path, output_directory: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();
        args.push("--store".into());
        args.push(store.into());
        args.push("--output-directory".into());
        args.push(output_directory.into());
        args.push("--json".into());
        args.push("-".into());
        args
    }

    /// Command for one invocation; stdio is left for the caller to wire
    pub(crate) fn command(&self, store: &Path, output_directory: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.command_args(store, output_directory));

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        cmd
    }
}
