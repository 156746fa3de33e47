//! Error types for the hypershape transformation engine
//!
//! Every failure is fatal for the pipeline invocation that raised it. The
//! engine is deterministic, so nothing here is ever retried internally.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while building mappings or transforming an IR tree
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A composite carries a type identifier with no mapping entry
    #[error("Unknown type '{type_id}' at {path}")]
    #[diagnostic(
        code(hypershape::mapping::unknown_type),
        help("Add a mapping entry for this class")
    )]
    UnknownType {
        /// The unresolved type identifier
        type_id: String,
        /// Location of the offending node
        path: String,
    },

    /// A node was reached again while it was still being visited
    #[error("Cyclic structure detected at {path}")]
    #[diagnostic(code(hypershape::ir::cyclic))]
    CyclicStructure {
        /// Location where the cycle closes
        path: String,
    },

    /// The requested operation is not provided by this engine
    #[error("Operation not supported: {operation}")]
    #[diagnostic(
        code(hypershape::unsupported),
        help("Hypermedia documents cannot be turned back into the source object graph")
    )]
    UnsupportedOperation {
        /// Name of the rejected operation
        operation: String,
    },

    /// A composite violates a structural invariant
    #[error("Malformed node at {path}: {reason}")]
    #[diagnostic(code(hypershape::ir::malformed))]
    MalformedNode {
        /// Location of the offending node
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// Recursion went deeper than the configured limit
    #[error("Maximum depth of {limit} exceeded at {path}")]
    #[diagnostic(
        code(hypershape::ir::too_deep),
        help("Raise the max_depth limit if this input is legitimate")
    )]
    DepthExceeded {
        /// Location of the first node past the limit
        path: String,
        /// The configured maximum depth
        limit: usize,
    },

    /// Expanding a shared-reference graph produced more nodes than allowed
    #[error("Node limit of {limit} exceeded at {path}")]
    #[diagnostic(
        code(hypershape::ir::too_large),
        help("Raise the max_nodes limit if this input is legitimate")
    )]
    NodeLimitExceeded {
        /// Location of the first node past the limit
        path: String,
        /// The configured maximum node count
        limit: usize,
    },

    /// The mapping set is invalid
    #[error("Configuration error: {message}")]
    #[diagnostic(code(hypershape::config::invalid))]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },

    /// Reading an input file failed
    #[error("I/O error reading {}: {source}", path.display())]
    #[diagnostic(code(hypershape::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// File that could not be read
        path: Box<Path>,
    },

    /// Decoding a mapping file or a tagged IR document failed
    #[error("Serialization error: {message}")]
    #[diagnostic(code(hypershape::serialization))]
    Serialization {
        /// Decoder message
        message: String,
    },
}

impl Error {
    /// Create an unknown type error
    #[must_use]
    pub fn unknown_type(type_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UnknownType {
            type_id: type_id.into(),
            path: path.into(),
        }
    }

    /// Create a cyclic structure error
    #[must_use]
    pub fn cyclic(path: impl Into<String>) -> Self {
        Self::CyclicStructure { path: path.into() }
    }

    /// Create an unsupported operation error
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Create a malformed node error
    #[must_use]
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedNode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a depth limit error
    #[must_use]
    pub fn depth_exceeded(path: impl Into<String>, limit: usize) -> Self {
        Self::DepthExceeded {
            path: path.into(),
            limit,
        }
    }

    /// Create a node limit error
    #[must_use]
    pub fn node_limit_exceeded(path: impl Into<String>, limit: usize) -> Self {
        Self::NodeLimitExceeded {
            path: path.into(),
            limit,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error for the given file
    #[must_use]
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into().into_boxed_path(),
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Result type for hypershape operations
pub type Result<T> = std::result::Result<T, Error>;
