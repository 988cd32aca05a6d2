//! Propagation-based solver
//!
//! Constraint model + worklist fixpoint engine + the builder use case that
//! orchestrates one construction. The call graph grows only here, from
//! dispatch constraints re-resolved as receiver points-to sets refine.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{BuildResult, BuildStats, CallGraphBuilder, PointsToResult};
pub use domain::{ComplexConstraint, DispatchConstraint, FlowEdge, PointsToSet};
pub use infrastructure::PropagationSystem;
