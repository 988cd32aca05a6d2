//! IR provider implementations
//!
//! - `IrProviderRegistry`: ordered, capability-checked provider composition
//! - `StoredIrProvider`: bodies read from a `MethodStore`
//! - `RootIrProvider`: the synthesized entrypoint root
//! - `LifecycleInterpreter`: on-demand synthesis for modeled launcher calls

mod lifecycle;
mod registry;
mod root;
mod stored;

pub use lifecycle::{LifecycleInterpreter, LifecycleRegistry, StartInfo};
pub use registry::IrProviderRegistry;
pub use root::RootIrProvider;
pub use stored::{MethodStore, StoredIrProvider};
