//! Error type shared by loaders, config persistence, and the CLI.
//!
//! The lint pass itself never fails: it takes typed snapshots and treats
//! missing kernel data as empty. Errors only arise at the boundaries where
//! files are read, parsed, or written, and where user input names a rule,
//! category, or mode.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReplintError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("failed to encode TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file parsed as JSON but does not have the nbformat 4 shape.
    #[error("{path} is not a notebook: {detail}")]
    Notebook { path: PathBuf, detail: String },

    #[error("unknown report id '{0}' (run `replint rules` to list them)")]
    UnknownRule(String),

    #[error("unknown category '{0}' (expected invalidtitle|hiddenstate|confusenotebook|import|absolutepath)")]
    UnknownCategory(String),

    #[error("unknown view mode '{0}' (expected list|cell|type)")]
    UnknownMode(String),

    #[error("{0}")]
    Config(String),
}

impl ReplintError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReplintError>;
