//! `kaniko build` command: run the executor with the given settings.
//!
//! Every executor setting has a flag. The command writes the registry auth
//! file, invokes `{kaniko-path}/executor`, and prints the captured build
//! log line by line. `--dry-run` prints the command line instead of
//! running it.

use std::path::PathBuf;

use clap::Args;
use kaniko::{BuildConfig, Executor, RegistryAuth, SnapshotMode, Verbosity};

#[derive(Args)]
pub struct BuildArgs {
    /// Kaniko installation path (executor binary and auth file live here)
    #[arg(long, default_value = kaniko::DEFAULT_KANIKO_PATH)]
    pub kaniko_path: PathBuf,

    /// Registry the auth entry is written for
    #[arg(long)]
    pub registry: Option<String>,

    /// Registry username (default: REGISTRY_USERNAME from the environment)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Registry password (default: REGISTRY_PASSWORD from the environment)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Read the registry password from stdin
    #[arg(long)]
    pub password_stdin: bool,

    /// Set a build-time variable (KEY=VALUE), can be repeated
    #[arg(long = "build-arg")]
    pub build_arg: Vec<String>,

    /// Cache layers in a remote repository
    #[arg(long)]
    pub cache: bool,

    /// Local directory holding cached base images
    #[arg(long)]
    pub cache_dir: Option<String>,

    /// Remote repository holding cached layers
    #[arg(long)]
    pub cache_repo: Option<String>,

    /// Clean the filesystem at the end of the build
    #[arg(long)]
    pub cleanup: bool,

    /// Build context directory or remote URI
    #[arg(long)]
    pub context: Option<String>,

    /// Destination image reference, can be repeated
    #[arg(long)]
    pub destination: Vec<String>,

    /// Write the digest of the built image to this file
    #[arg(long)]
    pub digest_file: Option<String>,

    /// Path to the Dockerfile
    #[arg(short = 'f', long)]
    pub dockerfile: Option<String>,

    /// Run even outside the expected container environment
    #[arg(long)]
    pub force: bool,

    /// Push to a plain HTTP registry
    #[arg(long)]
    pub insecure: bool,

    /// Pull from a plain HTTP registry
    #[arg(long)]
    pub insecure_pull: bool,

    /// Registry reached over plain HTTP, can be repeated
    #[arg(long)]
    pub insecure_registry: Vec<String>,

    /// Build without pushing to a registry
    #[arg(long)]
    pub no_push: bool,

    /// Write an OCI image layout to this directory
    #[arg(long)]
    pub oci_layout_path: Option<String>,

    /// Strip timestamps to make the image reproducible
    #[arg(long)]
    pub reproducible: bool,

    /// Take a single snapshot at the end of the build
    #[arg(long)]
    pub single_snapshot: bool,

    /// Skip TLS verification when pushing
    #[arg(long)]
    pub skip_tls_verify: bool,

    /// Skip TLS verification when pulling
    #[arg(long)]
    pub skip_tls_verify_pull: bool,

    /// Registry exempt from TLS verification, can be repeated
    #[arg(long)]
    pub skip_tls_verify_registry: Vec<String>,

    /// Filesystem snapshot strategy (full, time)
    #[arg(long)]
    pub snapshot_mode: Option<SnapshotMode>,

    /// Save the image as a tarball at this path instead of pushing
    #[arg(long)]
    pub tar_path: Option<String>,

    /// Target build stage in a multi-stage Dockerfile
    #[arg(long)]
    pub target: Option<String>,

    /// Executor log level (panic, fatal, error, warn, info, debug)
    #[arg(long)]
    pub verbosity: Option<Verbosity>,

    /// Print the executor command line without running it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;

    if args.dry_run {
        for token in config.shell_command() {
            println!("{token}");
        }
        return Ok(());
    }

    let lines = Executor::new(config).build()?;
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Map parsed flags onto an executor configuration.
fn build_config(args: &BuildArgs) -> Result<BuildConfig, Box<dyn std::error::Error>> {
    let (registry_username, registry_password) = resolve_credentials(args)?;
    Ok(BuildConfig {
        kaniko_path: args.kaniko_path.clone(),
        docker_registry_uri: args.registry.clone(),
        registry_username,
        registry_password,
        build_args: args.build_arg.clone(),
        cache: args.cache,
        cache_dir: args.cache_dir.clone(),
        cache_repo: args.cache_repo.clone(),
        cleanup: args.cleanup,
        context: args.context.clone(),
        destination: args.destination.clone(),
        digest_file: args.digest_file.clone(),
        dockerfile: args.dockerfile.clone(),
        force: args.force,
        insecure: args.insecure,
        insecure_pull: args.insecure_pull,
        insecure_registry: args.insecure_registry.clone(),
        no_push: args.no_push,
        oci_layout_path: args.oci_layout_path.clone(),
        reproducible: args.reproducible,
        single_snapshot: args.single_snapshot,
        skip_tls_verify: args.skip_tls_verify,
        skip_tls_verify_pull: args.skip_tls_verify_pull,
        skip_tls_verify_registry: args.skip_tls_verify_registry.clone(),
        snapshot_mode: args.snapshot_mode,
        tar_path: args.tar_path.clone(),
        target: args.target.clone(),
        verbosity: args.verbosity,
    })
}

/// Registry credentials: explicit flags win, otherwise the
/// REGISTRY_USERNAME/REGISTRY_PASSWORD pair from the environment.
fn resolve_credentials(
    args: &BuildArgs,
) -> Result<(Option<String>, Option<String>), Box<dyn std::error::Error>> {
    if args.username.is_some() || args.password.is_some() || args.password_stdin {
        let password = if args.password_stdin {
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            Some(input.trim().to_string())
        } else {
            args.password.clone()
        };
        return Ok((args.username.clone(), password));
    }

    Ok(
        match args
            .registry
            .as_ref()
            .and_then(|registry| RegistryAuth::from_env(registry.as_str()))
        {
            Some(auth) => (
                Some(auth.username().to_string()),
                Some(auth.password().to_string()),
            ),
            None => (None, None),
        },
    )
}
