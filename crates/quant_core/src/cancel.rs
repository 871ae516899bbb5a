//! Cooperative cancellation for long-running computations.

use crate::error::{QuantError, QuantResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag.
///
/// Cloning shares the underlying flag. Numeric loops poll it between work
/// chunks and bail out with [`QuantError::Cancelled`].
///
/// # Examples
/// ```
/// use quant_core::CancellationFlag;
///
/// let flag = CancellationFlag::new();
/// let worker_view = flag.clone();
/// assert!(worker_view.check().is_ok());
/// flag.cancel();
/// assert!(worker_view.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation was requested.
    #[inline]
    pub fn check(&self) -> QuantResult<()> {
        if self.is_cancelled() {
            Err(QuantError::Cancelled)
        } else {
            Ok(())
        }
    }
}
