//! Call graph
//!
//! Output structure of construction: an arena of (method, context)-interned
//! nodes with append-only per-site edges, plus read-side consumers —
//! statistics, the context-squashed projection, and the integrity checker.

pub mod graph;
pub mod integrity;
pub mod stats;

pub use graph::{CallGraph, CgNode};
pub use integrity::{IntegrityChecker, IntegrityReport, IntegrityViolation};
pub use stats::CallGraphStats;
