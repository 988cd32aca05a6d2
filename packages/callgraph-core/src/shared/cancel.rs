//! Cooperative cancellation
//!
//! The solver polls the token at every worklist iteration and every IR
//! synthesis; a set flag surfaces as `CallGraphError::Cancelled` and the
//! partially built graph is dropped, never returned as complete.

use crate::errors::{CallGraphError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation flag shared between the driver and the solver
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from another thread.
    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Bail out with `Cancelled` if the flag is set.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(CallGraphError::Cancelled)
        } else {
            Ok(())
        }
    }
}
