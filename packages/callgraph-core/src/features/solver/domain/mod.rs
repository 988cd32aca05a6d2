//! Solver domain models
//!
//! - `PointsToSet`: append-only sorted set of instance handles
//! - Constraint kinds: subset edges, complex (field/array) constraints,
//!   dormant dispatch constraints

mod constraint;
mod points_to_set;

pub use constraint::{ComplexConstraint, DispatchConstraint, FlowEdge};
pub use points_to_set::PointsToSet;
