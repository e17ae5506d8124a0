use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{ShowError, ShowResult};

/// Cooperative cancellation signal shared between a host and a running generation.
///
/// Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// New, not yet cancelled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// `true` once [`CancelFlag::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(ShowError::Cancelled)` once cancelled.
    pub fn check(&self) -> ShowResult<()> {
        if self.is_cancelled() {
            Err(ShowError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Poll an optional flag.
pub(crate) fn check_cancel(flag: Option<&CancelFlag>) -> ShowResult<()> {
    flag.map_or(Ok(()), CancelFlag::check)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/cancel.rs"]
mod tests;
