//! Caller-controlled cancellation for a traversal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Abort flag shared between the caller and a running traversal.
///
/// Clones share the flag. A signal created with [`AbortSignal::with_timeout`]
/// also reports aborted once its deadline has passed.
#[derive(Clone, Debug, Default)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl AbortSignal {
    /// Create a signal that only fires on [`abort`](Self::abort).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a signal that also fires once `timeout` has elapsed.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Request the traversal to stop.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether the flag was raised or the deadline has passed.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_signal_is_not_aborted() {
        assert!(!AbortSignal::new().is_aborted());
    }

    #[test]
    fn test_abort_is_shared_between_clones() {
        let signal = AbortSignal::new();
        let observer = signal.clone();

        signal.abort();

        assert!(observer.is_aborted());
    }

    #[test]
    fn test_elapsed_deadline_aborts() {
        let signal = AbortSignal::with_timeout(Duration::ZERO);

        assert!(signal.is_aborted());
    }

    #[test]
    fn test_distant_deadline_does_not_abort() {
        let signal = AbortSignal::with_timeout(Duration::from_secs(3600));

        assert!(!signal.is_aborted());
    }
}
