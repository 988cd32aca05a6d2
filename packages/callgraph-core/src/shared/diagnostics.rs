//! Construction diagnostics
//!
//! Non-fatal findings recorded while the graph is built: precision-loss
//! sources and constructs the generator has no rule for. Fatal conditions go
//! through `CallGraphError` instead; nothing here aborts construction.

use crate::shared::models::{MethodId, Selector, TypeName};
use serde::Serialize;

/// A single non-fatal finding, attached to the build result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Diagnostic {
    /// A modeled call site had several plausible component targets and one
    /// was chosen deterministically. Documented precision-loss source.
    AmbiguousModelTarget {
        launcher: Selector,
        candidates: Vec<TypeName>,
        chosen: TypeName,
    },

    /// No constraint rule for an instruction; the node is analyzed with
    /// reduced soundness.
    UnsupportedConstruct {
        method: MethodId,
        pc: u32,
        mnemonic: String,
    },

    /// Dispatch or argument seeding landed on an abstract type with no
    /// concrete subclasses; nothing can flow from it.
    AbstractTypeWithoutConcreteSubclass { ty: TypeName },

    /// The iteration guard stopped the solver early; the result is
    /// incomplete.
    IterationGuardTripped { iterations: usize },
}

impl Diagnostic {
    /// Stable label used in logs and assertions
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::AmbiguousModelTarget { .. } => "ambiguous-model-target",
            Diagnostic::UnsupportedConstruct { .. } => "unsupported-construct",
            Diagnostic::AbstractTypeWithoutConcreteSubclass { .. } => "abstract-without-concrete",
            Diagnostic::IterationGuardTripped { .. } => "iteration-guard",
        }
    }
}

/// Append-only collection of diagnostics for one construction
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    entries: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    #[inline]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.entries.iter().filter(|d| d.kind() == kind).count()
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
