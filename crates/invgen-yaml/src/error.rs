//! Error types for YAML loading and dumping.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for invgen-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing YAML.
#[derive(Debug, Error)]
pub enum Error {
    /// YAML syntax error, with the 1-based position when the parser reports one.
    #[error("{}", describe_parse(file.as_deref(), *line, *column, message))]
    Parse {
        message: String,
        file: Option<String>,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// The document parsed, but its top level is not a mapping.
    #[error("expected a mapping at the top level of {file}, found {found}")]
    NotAMapping { file: String, found: &'static str },

    /// A value could not be serialized.
    #[error("failed to serialize YAML: {0}")]
    Serialize(String),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn from_parse(err: serde_yaml::Error, file: Option<&str>) -> Self {
        let location = err.location();
        Error::Parse {
            message: err.to_string(),
            file: file.map(str::to_string),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

fn describe_parse(
    file: Option<&str>,
    line: Option<usize>,
    column: Option<usize>,
    message: &str,
) -> String {
    match (file, line, column) {
        (Some(file), Some(line), Some(column)) => {
            format!("parse error in {file} at line {line}, column {column}: {message}")
        }
        (Some(file), _, _) => format!("parse error in {file}: {message}"),
        (None, _, _) => format!("parse error: {message}"),
    }
}
