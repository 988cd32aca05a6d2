//! Shared module - Common types and utilities
//!
//! Types shared across all features: dense identifiers, name/value models,
//! the cooperative cancellation token, and the diagnostic sink.

pub mod cancel;
pub mod diagnostics;
pub mod models;

// Re-exports for convenience
pub use cancel::CancelToken;
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use models::*;
