//! Error types for callgraph-core
//!
//! Fatal taxonomy only: recoverable imprecision is reported through
//! `shared::diagnostics` and never aborts construction.

use thiserror::Error;

use crate::features::call_graph::integrity::IntegrityReport;

/// Main error type for call-graph construction
#[derive(Debug, Error)]
pub enum CallGraphError {
    /// Invalid entrypoints or option combination; raised before solving starts
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unresolvable type or method; aborts construction
    #[error("class hierarchy error: {0}")]
    ClassHierarchy(String),

    /// Cooperative cancellation observed; the partial graph is discarded
    #[error("construction cancelled")]
    Cancelled,

    /// Structural validation failed after construction
    #[error("integrity check failed: {0}")]
    Integrity(#[from] IntegrityReport),
}

impl CallGraphError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        CallGraphError::Configuration(msg.into())
    }

    /// Create a class hierarchy error
    pub fn hierarchy(msg: impl Into<String>) -> Self {
        CallGraphError::ClassHierarchy(msg.into())
    }
}

/// Result type alias for call-graph operations
pub type Result<T> = std::result::Result<T, CallGraphError>;
