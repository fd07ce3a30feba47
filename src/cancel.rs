//! Cooperative cancellation for long-running generation stages

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{MapError, Result};

/// Shared flag a caller trips to abort generation on another thread
///
/// River carving checks it once per candidate source and noisy edge synthesis
/// once per boundary. A tripped token makes the stage return
/// [`MapError::Cancelled`]; the half-built graph is dropped with the error.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Checkpoint: `Err(Cancelled)` once the token has been tripped
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(MapError::Cancelled)
        } else {
            Ok(())
        }
    }
}
