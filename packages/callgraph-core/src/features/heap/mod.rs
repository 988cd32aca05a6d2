//! Heap abstraction
//!
//! Instance keys name abstract runtime objects; pointer keys name abstract
//! storage locations. Both are interned into dense handles by `HeapModel`
//! (arena/index model) so the solver's dependency graph and worklist hold
//! plain `u32`s instead of owning key values.

mod keys;
mod model;

pub use keys::{InstanceKey, PointerKey};
pub use model::HeapModel;
