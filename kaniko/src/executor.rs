//! Synchronous invocation of the kaniko executor.
//!
//! [`Executor`] owns a [`BuildConfig`], writes the registry auth file,
//! spawns `{kaniko_path}/executor` with the rendered flags, and captures
//! stdout and stderr as a single interleaved stream. A nonzero exit code
//! surfaces as [`KanikoError::BuildFailed`] carrying the captured log
//! lines.

use duct::cmd;
use tracing::{debug, info, warn};

use crate::auth::write_docker_config;
use crate::config::{BuildConfig, Overrides};
use crate::error::{KanikoError, Result};

/// Drives one executor process per build.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: BuildConfig,
}

impl Executor {
    /// Executor over the given base configuration.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// The base configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run a build with the base configuration.
    ///
    /// Returns the trimmed log lines of a successful build.
    pub fn build(&self) -> Result<Vec<String>> {
        run(&self.config)
    }

    /// Run a build with overrides applied on top of the base configuration.
    ///
    /// The base configuration is left untouched, so one executor can serve
    /// many builds with per-build settings.
    pub fn build_with(&self, overrides: &Overrides) -> Result<Vec<String>> {
        let config = self.config.merge(overrides)?;
        run(&config)
    }
}

/// Write the auth file, spawn the executor, and collect its output.
fn run(config: &BuildConfig) -> Result<Vec<String>> {
    write_docker_config(&config.kaniko_path, config.registry_auth().as_ref())?;

    let executor = config.executor_path();
    let flags = config.flag_args();
    info!(executor = %executor.display(), flags = flags.len(), "invoking executor");
    debug!(command = ?config.shell_command(), "executor command line");

    // stderr joins stdout at the fd level so the captured lines interleave
    // in the order the executor produced them.
    let output = cmd(executor, flags)
        .stderr_to_stdout()
        .stdout_capture()
        .unchecked()
        .run()?;

    let lines = parse_logs(&output.stdout);
    if output.status.success() {
        debug!(lines = lines.len(), "executor finished");
        return Ok(lines);
    }

    // A signal-terminated child has no exit code; report it as -1.
    let exit_code = output.status.code().unwrap_or(-1);
    warn!(exit_code, "executor failed");
    Err(KanikoError::BuildFailed { exit_code, lines })
}

/// Split captured executor output into trimmed lines.
///
/// The bytes are decoded lossily, the buffer is trimmed as a whole, and
/// every line is trimmed individually. Empty input yields a single empty
/// line.
pub fn parse_logs(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .trim()
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}
