//! Solver application layer

mod builder;

pub use builder::{BuildResult, BuildStats, CallGraphBuilder, PointsToResult};
