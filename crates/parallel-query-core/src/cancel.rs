//! Cooperative cancellation token.
//!
//! A clonable handle over a shared atomic flag. The caller cancels; workers
//! observe the flag between element pulls. Write-once-observed-many: once
//! set, the flag never clears for the lifetime of the call that carries it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation handle shared between the caller and the engine.
///
/// Cloning produces another handle to the same flag, so a token handed to a
/// query can be canceled from any thread that kept a clone.
///
/// # Example
///
/// ```
/// use parallel_query_core::cancel::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_canceled());
///
/// token.cancel();
/// assert!(observer.is_canceled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    canceled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a fresh, un-canceled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_is_not_canceled() {
        assert!(!CancellationToken::new().is_canceled());
    }

    #[test]
    fn test_cancel_is_visible_through_clones() {
        let token = CancellationToken::new();
        let observer = token.clone();
        token.cancel();
        assert!(observer.is_canceled());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_canceled());
    }

    #[test]
    fn test_cancel_is_visible_across_threads() {
        let token = CancellationToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel())
            .join()
            .expect("cancel thread panicked");
        assert!(token.is_canceled());
    }
}
