//! CLI error types rendered through miette
//!
//! Engine errors keep their own diagnostic codes; this layer adds the
//! failures that only exist at the command line.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error types with enhanced diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("No mapping serves resource '{resource}'")]
    #[diagnostic(
        code(hypershape::cli::unknown_resource),
        help("Run 'hypershape mappings' to list the mapped resources")
    )]
    UnknownResource { resource: String },

    #[error("File operation failed: {operation} {}", path.display())]
    #[diagnostic(
        code(hypershape::cli::file_error),
        help("Check file permissions and ensure the path exists")
    )]
    FileError {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] hypershape_core::Error),
}

impl CliError {
    pub fn unknown_resource(resource: impl Into<String>) -> Self {
        Self::UnknownResource {
            resource: resource.into(),
        }
    }

    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileError {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
