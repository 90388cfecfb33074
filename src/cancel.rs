//! Cooperative cancellation token shared between the dispatcher and a
//! backend working on a request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cancellation token for one in-flight request.
///
/// The token can be cloned and handed to whatever context executes the
/// request; when `cancel()` is called on any clone, all clones observe it.
/// Cancellation is advisory: the backend polls the token at its own pace.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Safe to call any number of times.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
