//! Kaniko - Typed Configuration and Invoker for the Kaniko Executor
//!
//! This crate wraps the kaniko executor for in-container image builds: it
//! models every executor setting as a typed field, renders the settings into
//! the command line in a fixed order, writes the Docker-style registry auth
//! file, and runs builds synchronously with captured logs.

pub mod auth;
pub mod config;
pub mod error;
pub mod executor;
pub mod flags;

// Re-export commonly used types
pub use auth::{write_docker_config, RegistryAuth};
pub use config::{BuildConfig, Overrides, DEFAULT_KANIKO_PATH};
pub use error::{KanikoError, Result};
pub use executor::{parse_logs, Executor};
pub use flags::{SnapshotMode, Verbosity};

/// Kaniko wrapper version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
