//! Registry credentials and the Docker-style auth file.
//!
//! The executor picks up push and pull credentials from
//! `{kaniko_path}/.docker/config.json`, the same shape `docker login`
//! produces: an `auths` map keyed by registry URI whose entries carry
//! base64-encoded `username:password`.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Directory under the installation path holding the auth file.
const AUTH_DIR: &str = ".docker";

/// Auth file name inside the auth directory.
const AUTH_FILE: &str = "config.json";

/// Environment variable consulted for a fallback registry username.
pub const ENV_REGISTRY_USERNAME: &str = "REGISTRY_USERNAME";

/// Environment variable consulted for a fallback registry password.
pub const ENV_REGISTRY_PASSWORD: &str = "REGISTRY_PASSWORD";

/// Basic credentials for one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAuth {
    registry: String,
    username: String,
    password: String,
}

impl RegistryAuth {
    /// Username and password credentials for `registry`.
    pub fn basic(
        registry: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            registry: registry.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Credentials for `registry` taken from `REGISTRY_USERNAME` and
    /// `REGISTRY_PASSWORD`. Returns `None` unless both variables are set.
    pub fn from_env(registry: impl Into<String>) -> Option<Self> {
        let username = env::var(ENV_REGISTRY_USERNAME).ok()?;
        let password = env::var(ENV_REGISTRY_PASSWORD).ok()?;
        Some(Self::basic(registry, username, password))
    }

    /// Registry URI the credentials belong to.
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// Login name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password in the clear, as it entered the auth file.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Auth file payload: base64 of `username:password`.
    pub fn encoded(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.password))
    }
}

/// Serialized shape of `.docker/config.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DockerConfigFile {
    auths: BTreeMap<String, AuthEntry>,
}

/// One registry entry in the auth file.
#[derive(Debug, Serialize, Deserialize)]
struct AuthEntry {
    auth: String,
}

/// Write the auth file under `kaniko_path` and return its path.
///
/// The file is rewritten on every call. Without credentials it holds an
/// empty `auths` map, which also drops any entry left behind by a previous
/// build.
pub fn write_docker_config(kaniko_path: &Path, auth: Option<&RegistryAuth>) -> Result<PathBuf> {
    let mut file = DockerConfigFile::default();
    if let Some(auth) = auth {
        file.auths.insert(
            auth.registry.clone(),
            AuthEntry {
                auth: auth.encoded(),
            },
        );
    }

    let dir = kaniko_path.join(AUTH_DIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(AUTH_FILE);
    fs::write(&path, serde_json::to_string_pretty(&file)?)?;
    debug!(
        path = %path.display(),
        entries = file.auths.len(),
        "wrote registry auth file"
    );
    Ok(path)
}
