//! Error types for invgen-core

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvgenError {
    #[error("metadata type '{metadata_type}' not found (expected directory {})", expected_dir.display())]
    MetadataTypeNotFound {
        metadata_type: String,
        expected_dir: PathBuf,
    },

    #[error("host '{host}' has no metadata section")]
    MissingMetadataSection { host: String },

    #[error("host '{host}' is missing required metadata type '{metadata_type}'")]
    MissingRequiredMetadata { host: String, metadata_type: String },

    #[error("host '{host}': metadata must be a mapping, found {found}")]
    InvalidMetadataSection { host: String, found: &'static str },

    #[error("host '{host}': invalid metadata selector for '{metadata_type}': expected a name or a list of names, found {found}")]
    InvalidMetadataSelector {
        host: String,
        metadata_type: String,
        found: &'static str,
    },

    #[error("generated file for host '{host}' is not valid YAML: {message}")]
    GeneratedFileInvalid { host: String, message: String },

    #[error("duplicate host name '{name}': {} and {}", first.display(), second.display())]
    DuplicateHostName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: invgen_yaml::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("{} host(s) failed to generate: {}", failures.len(), summarize(failures))]
    GenerationFailed { failures: Vec<HostFailure> },
}

/// One host's error, collected when generation continues past failures.
#[derive(Debug)]
pub struct HostFailure {
    pub host: String,
    pub error: InvgenError,
}

impl InvgenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn yaml(path: impl Into<PathBuf>, source: invgen_yaml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }

    /// The host this error belongs to, when it is scoped to a single host.
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::MissingMetadataSection { host }
            | Self::MissingRequiredMetadata { host, .. }
            | Self::InvalidMetadataSection { host, .. }
            | Self::InvalidMetadataSelector { host, .. }
            | Self::GeneratedFileInvalid { host, .. } => Some(host),
            _ => None,
        }
    }
}

fn summarize(failures: &[HostFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.host, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, InvgenError>;
