//! Feature modules
//!
//! Vertical slices of the engine, leaves first:
//! hierarchy → ir / context / heap → solver → call_graph → icfg

pub mod call_graph;
pub mod context;
pub mod heap;
pub mod hierarchy;
pub mod icfg;
pub mod ir;
pub mod solver;
