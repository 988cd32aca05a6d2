/*
 * callgraph-core - context-sensitive call-graph / points-to engine
 *
 * Feature-First Architecture:
 * - shared/      : identifiers, cancellation, diagnostics
 * - features/    : vertical slices (hierarchy → ir / context / heap →
 *                  solver → call_graph → icfg)
 * - config/      : analysis options and the precision ladder
 *
 * Construction is a single-worker worklist fixpoint: entrypoints seed the
 * synthetic root, constraints populate a dependency graph over interned
 * pointer keys, and dispatch constraints grow the call graph as receiver
 * points-to sets refine. The finished graph and points-to mapping are
 * immutable and safe for unsynchronized concurrent reads.
 */

#![allow(clippy::new_without_default)] // Default impl not always meaningful
#![allow(clippy::too_many_arguments)] // call-wiring paths carry full context
#![allow(clippy::module_inception)] // feature/feature.rs naming intentional

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

/// Feature modules
pub mod features;

/// Shared models and utilities
pub mod shared;

// Re-exports: the surface a consumer needs for one construction
pub use config::{AnalysisOptions, PrecisionPolicy};
pub use errors::{CallGraphError, Result};
pub use features::call_graph::{
    CallGraph, CallGraphStats, CgNode, IntegrityChecker, IntegrityReport, IntegrityViolation,
};
pub use features::context::{Context, ContextItem, ContextKey, ContextSelector};
pub use features::heap::{HeapModel, InstanceKey, PointerKey};
pub use features::hierarchy::{ClassHierarchy, HierarchyBuilder, InMemoryHierarchy};
pub use features::icfg::{BlockInContext, InterproceduralCfg};
pub use features::ir::{
    DispatchKind, IrBody, IrBuilder, IrProvider, IrProviderRegistry, LifecycleRegistry,
    MethodStore, StartInfo,
};
pub use features::solver::{BuildResult, BuildStats, CallGraphBuilder, PointsToResult};
pub use shared::{CancelToken, Diagnostic, DiagnosticSink};
pub use shared::models::{FieldRef, InstId, MethodId, NodeId, PtrId, Selector, TypeId, TypeName, Var};
