//! Analysis configuration
//!
//! Options are validated before solving starts; a bad combination is a
//! `ConfigurationError`, never a mid-solve surprise.

use serde::{Deserialize, Serialize};

use crate::shared::models::TypeName;

/// Built-in precision ladder, least precise first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrecisionPolicy {
    /// Single context for every method
    #[default]
    Insensitive,

    /// Call-string of length 1: one context per call site
    CallString,

    /// Receiver-object sensitivity restricted to registered container
    /// types, keyed additionally by declared element type
    Container,

    /// Receiver-object sensitivity for every instance call
    ReceiverObject,
}

impl PrecisionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrecisionPolicy::Insensitive => "insensitive",
            PrecisionPolicy::CallString => "call-string-1",
            PrecisionPolicy::Container => "container",
            PrecisionPolicy::ReceiverObject => "receiver-object",
        }
    }
}

/// Options for one construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub policy: PrecisionPolicy,

    /// Types treated as containers by the `Container` policy
    pub container_types: Vec<TypeName>,

    /// Iteration guard; 0 means unlimited. Tripping it yields an incomplete
    /// result marked by a diagnostic.
    pub max_iterations: usize,

    /// Run the integrity checker on the finished graph
    pub verify: bool,

    /// Report only the first integrity violation instead of all
    pub fail_fast_integrity: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            policy: PrecisionPolicy::Insensitive,
            container_types: Vec::new(),
            max_iterations: 0,
            verify: true,
            fail_fast_integrity: false,
        }
    }
}

impl AnalysisOptions {
    pub fn with_policy(policy: PrecisionPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }
}
