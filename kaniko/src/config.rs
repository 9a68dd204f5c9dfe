//! Build configuration for the kaniko executor.
//!
//! [`BuildConfig`] holds one typed field per executor setting and renders the
//! settings into the executor's argv. Settings arrive either as plain struct
//! fields or as a JSON override map applied with [`BuildConfig::merge`], which
//! skips unknown keys by policy. Flag order is fixed by the renderer table and
//! asserted by tests.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::RegistryAuth;
use crate::error::{KanikoError, Result};
use crate::flags::{SnapshotMode, Verbosity};

/// Default installation path of kaniko.
pub const DEFAULT_KANIKO_PATH: &str = "/kaniko";

/// Executor binary name under the installation path.
const EXECUTOR_BIN: &str = "executor";

/// Bulk configuration overrides: setting name to JSON value.
///
/// Keys that do not name a setting are ignored; `null` resets a setting to
/// its default.
pub type Overrides = serde_json::Map<String, Value>;

/// Settings for one executor invocation.
///
/// Every field maps to an executor flag except `kaniko_path` (locates the
/// binary) and the three registry credential fields (serialized into the
/// auth file, never passed on the command line). Unset optionals, empty
/// lists, and false booleans emit nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Installation path; the executor lives at `{kaniko_path}/executor`
    /// and the auth file at `{kaniko_path}/.docker/config.json`.
    pub kaniko_path: PathBuf,

    /// Registry URI the auth entry is keyed by.
    pub docker_registry_uri: Option<String>,
    /// Login for the auth entry.
    pub registry_username: Option<String>,
    /// Password for the auth entry.
    pub registry_password: Option<String>,

    // Flag settings below are declared in rendering order.
    /// Dockerfile `ARG` overrides, one `--build-arg=KEY=VALUE` each.
    pub build_args: Vec<String>,
    /// Opt in to layer caching (`--cache`).
    pub cache: bool,
    /// Local directory cache for base images (`--cache-dir`).
    pub cache_dir: Option<String>,
    /// Remote repository for cached layers (`--cache-repo`).
    pub cache_repo: Option<String>,
    /// Clean the filesystem at the end of the build (`--cleanup`).
    pub cleanup: bool,
    /// Build context directory (`--context`).
    pub context: Option<String>,
    /// Destination image references, one `--destination=` each.
    pub destination: Vec<String>,
    /// File that receives the digest of the built image (`--digest-file`).
    pub digest_file: Option<String>,
    /// Path to the Dockerfile (`--dockerfile`).
    pub dockerfile: Option<String>,
    /// Run outside the expected container environment (`--force`).
    pub force: bool,
    /// Push to a plain HTTP registry (`--insecure`).
    pub insecure: bool,
    /// Pull from a plain HTTP registry (`--insecure-pull`).
    pub insecure_pull: bool,
    /// Registries reached over plain HTTP (`--insecure-registry`, repeatable).
    pub insecure_registry: Vec<String>,
    /// Build without pushing to a registry (`--no-push`).
    pub no_push: bool,
    /// Directory receiving the OCI layout of the built image
    /// (`--oci-layout-path`).
    pub oci_layout_path: Option<String>,
    /// Strip timestamps to make the image reproducible (`--reproducible`).
    pub reproducible: bool,
    /// Take a single snapshot at the end of the build (`--single-snapshot`).
    pub single_snapshot: bool,
    /// Skip TLS verification when pushing (`--skip-tls-verify`).
    pub skip_tls_verify: bool,
    /// Skip TLS verification when pulling (`--skip-tls-verify-pull`).
    pub skip_tls_verify_pull: bool,
    /// Registries exempt from TLS verification
    /// (`--skip-tls-verify-registry`, repeatable).
    pub skip_tls_verify_registry: Vec<String>,
    /// Filesystem snapshot strategy (`--snapshotMode`).
    pub snapshot_mode: Option<SnapshotMode>,
    /// Save the image as a tarball instead of pushing (`--tarPath`).
    pub tar_path: Option<String>,
    /// Target build stage (`--target`).
    pub target: Option<String>,
    /// Executor log level (`--verbosity`).
    pub verbosity: Option<Verbosity>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            kaniko_path: PathBuf::from(DEFAULT_KANIKO_PATH),
            docker_registry_uri: None,
            registry_username: None,
            registry_password: None,
            build_args: Vec::new(),
            cache: false,
            cache_dir: None,
            cache_repo: None,
            cleanup: false,
            context: None,
            destination: Vec::new(),
            digest_file: None,
            dockerfile: None,
            force: false,
            insecure: false,
            insecure_pull: false,
            insecure_registry: Vec::new(),
            no_push: false,
            oci_layout_path: None,
            reproducible: false,
            single_snapshot: false,
            skip_tls_verify: false,
            skip_tls_verify_pull: false,
            skip_tls_verify_registry: Vec::new(),
            snapshot_mode: None,
            tar_path: None,
            target: None,
            verbosity: None,
        }
    }
}

/// Flag renderers evaluated in declaration order.
///
/// This sequence is the command-line contract: reordering it reorders the
/// argv handed to the executor.
const FLAG_RENDERERS: &[fn(&BuildConfig, &mut Vec<String>)] = &[
    |c, argv| push_repeated(argv, "--build-arg", &c.build_args),
    |c, argv| push_switch(argv, "--cache", c.cache),
    |c, argv| push_value(argv, "--cache-dir", &c.cache_dir),
    |c, argv| push_value(argv, "--cache-repo", &c.cache_repo),
    |c, argv| push_switch(argv, "--cleanup", c.cleanup),
    |c, argv| push_value(argv, "--context", &c.context),
    |c, argv| push_repeated(argv, "--destination", &c.destination),
    |c, argv| push_value(argv, "--digest-file", &c.digest_file),
    |c, argv| push_value(argv, "--dockerfile", &c.dockerfile),
    |c, argv| push_switch(argv, "--force", c.force),
    |c, argv| push_switch(argv, "--insecure", c.insecure),
    |c, argv| push_switch(argv, "--insecure-pull", c.insecure_pull),
    |c, argv| push_repeated(argv, "--insecure-registry", &c.insecure_registry),
    |c, argv| push_switch(argv, "--no-push", c.no_push),
    |c, argv| push_value(argv, "--oci-layout-path", &c.oci_layout_path),
    |c, argv| push_switch(argv, "--reproducible", c.reproducible),
    |c, argv| push_switch(argv, "--single-snapshot", c.single_snapshot),
    |c, argv| push_switch(argv, "--skip-tls-verify", c.skip_tls_verify),
    |c, argv| push_switch(argv, "--skip-tls-verify-pull", c.skip_tls_verify_pull),
    |c, argv| push_repeated(argv, "--skip-tls-verify-registry", &c.skip_tls_verify_registry),
    |c, argv| {
        if let Some(mode) = c.snapshot_mode {
            argv.push(format!("--snapshotMode={mode}"));
        }
    },
    |c, argv| push_value(argv, "--tarPath", &c.tar_path),
    |c, argv| push_value(argv, "--target", &c.target),
    |c, argv| {
        if let Some(level) = c.verbosity {
            argv.push(format!("--verbosity={level}"));
        }
    },
];

/// One `--flag=value` token per list element; nothing for an empty list.
fn push_repeated(argv: &mut Vec<String>, flag: &str, values: &[String]) {
    for value in values {
        argv.push(format!("{flag}={value}"));
    }
}

/// The bare `--flag` token, only when the switch is on.
fn push_switch(argv: &mut Vec<String>, flag: &str, on: bool) {
    if on {
        argv.push(flag.to_string());
    }
}

/// A single `--flag=value` token, only when the setting is present.
fn push_value(argv: &mut Vec<String>, flag: &str, value: &Option<String>) {
    if let Some(value) = value {
        argv.push(format!("{flag}={value}"));
    }
}

impl BuildConfig {
    /// Path to the executor binary: `{kaniko_path}/executor`.
    pub fn executor_path(&self) -> PathBuf {
        self.kaniko_path.join(EXECUTOR_BIN)
    }

    /// Registry credentials, when fully configured.
    ///
    /// Requires all three of registry URI, username, and password; partial
    /// credentials produce no auth entry.
    pub fn registry_auth(&self) -> Option<RegistryAuth> {
        match (
            &self.docker_registry_uri,
            &self.registry_username,
            &self.registry_password,
        ) {
            (Some(registry), Some(username), Some(password)) => {
                Some(RegistryAuth::basic(registry, username, password))
            }
            _ => None,
        }
    }

    /// Flag tokens in the fixed declaration order of [`FLAG_RENDERERS`].
    pub fn flag_args(&self) -> Vec<String> {
        let mut argv = Vec::new();
        for render in FLAG_RENDERERS {
            render(self, &mut argv);
        }
        argv
    }

    /// Full argv for an invocation: the executor path followed by the flags.
    pub fn shell_command(&self) -> Vec<String> {
        let mut argv = vec![self.executor_path().to_string_lossy().into_owned()];
        argv.extend(self.flag_args());
        argv
    }

    /// Return a copy with the recognized overrides applied.
    ///
    /// Keys that do not name a setting are skipped silently, so callers may
    /// pass along configuration maps that carry entries for other tools. A
    /// recognized key whose value does not coerce to the setting's type is
    /// reported as [`KanikoError::InvalidValue`].
    pub fn merge(&self, overrides: &Overrides) -> Result<Self> {
        let mut merged = self.clone();
        for (key, value) in overrides {
            merged.apply(key, value)?;
        }
        Ok(merged)
    }

    /// Apply a single override in place. Unknown keys are a no-op.
    fn apply(&mut self, key: &str, value: &Value) -> Result<()> {
        match key {
            "kaniko_path" => self.kaniko_path = coerce_path(key, value)?,
            "docker_registry_uri" => self.docker_registry_uri = coerce(key, value)?,
            "registry_username" => self.registry_username = coerce(key, value)?,
            "registry_password" => self.registry_password = coerce(key, value)?,
            "build_args" => self.build_args = coerce_list(key, value)?,
            "cache" => self.cache = coerce_switch(key, value)?,
            "cache_dir" => self.cache_dir = coerce(key, value)?,
            "cache_repo" => self.cache_repo = coerce(key, value)?,
            "cleanup" => self.cleanup = coerce_switch(key, value)?,
            "context" => self.context = coerce(key, value)?,
            "destination" => self.destination = coerce_destination(key, value)?,
            "digest_file" => self.digest_file = coerce(key, value)?,
            "dockerfile" => self.dockerfile = coerce(key, value)?,
            "force" => self.force = coerce_switch(key, value)?,
            "insecure" => self.insecure = coerce_switch(key, value)?,
            "insecure_pull" => self.insecure_pull = coerce_switch(key, value)?,
            "insecure_registry" => self.insecure_registry = coerce_list(key, value)?,
            "no_push" => self.no_push = coerce_switch(key, value)?,
            "oci_layout_path" => self.oci_layout_path = coerce(key, value)?,
            "reproducible" => self.reproducible = coerce_switch(key, value)?,
            "single_snapshot" => self.single_snapshot = coerce_switch(key, value)?,
            "skip_tls_verify" => self.skip_tls_verify = coerce_switch(key, value)?,
            "skip_tls_verify_pull" => self.skip_tls_verify_pull = coerce_switch(key, value)?,
            "skip_tls_verify_registry" => {
                self.skip_tls_verify_registry = coerce_list(key, value)?
            }
            "snapshot_mode" => self.snapshot_mode = coerce(key, value)?,
            "tar_path" => self.tar_path = coerce(key, value)?,
            "target" => self.target = coerce(key, value)?,
            "verbosity" => self.verbosity = coerce(key, value)?,
            // Unknown setting: ignored by policy.
            _ => {}
        }
        Ok(())
    }
}

/// Deserialize an override value into the setting's declared type.
fn coerce<T: serde::de::DeserializeOwned>(key: &str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|source| KanikoError::InvalidValue {
        key: key.to_string(),
        source,
    })
}

/// List settings: `null` resets to empty.
fn coerce_list(key: &str, value: &Value) -> Result<Vec<String>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    coerce(key, value)
}

/// Boolean settings: `null` resets to off.
fn coerce_switch(key: &str, value: &Value) -> Result<bool> {
    if value.is_null() {
        return Ok(false);
    }
    coerce(key, value)
}

/// `kaniko_path`: `null` resets to the default installation path.
fn coerce_path(key: &str, value: &Value) -> Result<PathBuf> {
    if value.is_null() {
        return Ok(PathBuf::from(DEFAULT_KANIKO_PATH));
    }
    coerce(key, value)
}

/// `destination` accepts a single reference or a list of references.
fn coerce_destination(key: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(reference) => Ok(vec![reference.clone()]),
        _ => coerce(key, value),
    }
}
