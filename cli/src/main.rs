//! Kaniko CLI entry point.

use clap::Parser;
use kaniko::KanikoError;
use tracing_subscriber::EnvFilter;

use kaniko_cli::commands::{dispatch, Cli};

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {e}");
        std::process::exit(exit_code(e.as_ref()));
    }
}

/// Process exit code for a failure: a failed build propagates the
/// executor's own exit code, everything else exits 1.
fn exit_code(error: &(dyn std::error::Error + 'static)) -> i32 {
    match error.downcast_ref::<KanikoError>() {
        Some(KanikoError::BuildFailed { exit_code, .. }) if *exit_code > 0 => *exit_code,
        _ => 1,
    }
}
