// Error types for exprkey.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::expr::{NodeType, Shape};

/// Errors reported at the public boundary of the crate.
///
/// Tree mismatches are never errors; comparisons simply return `false`.
#[derive(Debug, Error)]
pub enum ExprError {
    /// A required argument was absent.
    #[error("argument `{name}` must not be null")]
    NullArgument { name: &'static str },

    /// A node was built with a payload that does not belong to its node type.
    #[error("node type {node_type:?} cannot carry a {shape:?} payload")]
    ShapeMismatch { node_type: NodeType, shape: Shape },

    #[error("invalid comparer configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
