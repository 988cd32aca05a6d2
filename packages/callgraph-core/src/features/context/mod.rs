//! Analysis contexts
//!
//! A context disambiguates multiple analyses of one method under different
//! calling circumstances. Contexts are immutable small tag→value maps,
//! compared by value; selection policies are pure functions composed
//! most-specific-wins with the insensitive context as the final fallback.

mod domain;
mod selectors;

pub use domain::{Context, ContextItem, ContextKey};
pub use selectors::{
    CallStringPolicy, ContainerPolicy, ContextPolicy, ContextQuery, ContextSelector,
    LaunchTargetPolicy, ReceiverInstancePolicy,
};
