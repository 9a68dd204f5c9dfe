//! Enumerated executor settings with fixed string forms.

use serde::{Deserialize, Serialize};

/// Filesystem snapshot strategy (`--snapshotMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotMode {
    /// Hash file contents to detect changes between layers (executor default).
    Full,
    /// Consider only file mtime when snapshotting.
    Time,
}

impl SnapshotMode {
    /// The symbolic form the executor expects on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Time => "time",
        }
    }
}

impl std::fmt::Display for SnapshotMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SnapshotMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "time" => Ok(Self::Time),
            _ => Err(format!(
                "unknown snapshot mode: '{}' (supported: full, time)",
                s
            )),
        }
    }
}

/// Executor log level (`--verbosity`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Panic,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
}

impl Verbosity {
    /// The symbolic form the executor expects on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Panic => "panic",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "panic" => Ok(Self::Panic),
            "fatal" => Ok(Self::Fatal),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            _ => Err(format!(
                "unknown verbosity: '{}' (supported: panic, fatal, error, warn, info, debug)",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_mode_from_str() {
        assert_eq!("full".parse::<SnapshotMode>().unwrap(), SnapshotMode::Full);
        assert_eq!("time".parse::<SnapshotMode>().unwrap(), SnapshotMode::Time);
        assert!("mtime".parse::<SnapshotMode>().is_err());
    }

    #[test]
    fn test_snapshot_mode_display() {
        assert_eq!(SnapshotMode::Full.to_string(), "full");
        assert_eq!(SnapshotMode::Time.to_string(), "time");
    }

    #[test]
    fn test_verbosity_from_str() {
        assert_eq!("panic".parse::<Verbosity>().unwrap(), Verbosity::Panic);
        assert_eq!("debug".parse::<Verbosity>().unwrap(), Verbosity::Debug);
        assert!("trace".parse::<Verbosity>().is_err());
    }

    #[test]
    fn test_verbosity_display() {
        assert_eq!(Verbosity::Warn.to_string(), "warn");
        assert_eq!(Verbosity::Info.to_string(), "info");
    }

    #[test]
    fn test_serde_forms_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&SnapshotMode::Time).unwrap(),
            "\"time\""
        );
        assert_eq!(serde_json::to_string(&Verbosity::Fatal).unwrap(), "\"fatal\"");
        let v: Verbosity = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(v, Verbosity::Error);
    }
}
