//! Single-flight guard for full scrape cycles.
//!
//! The scheduler and the manual run-all trigger share one guard so a slow
//! cycle is never stacked on top of a running one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared at-most-one-run flag. Cheap to clone.
#[derive(Clone, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    /// Create a new, unheld guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the guard. Returns `None` when a run is already in
    /// flight; the permit releases the guard on drop.
    #[must_use]
    pub fn try_acquire(&self) -> Option<RunPermit> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(RunPermit {
                running: Arc::clone(&self.running),
            })
        } else {
            None
        }
    }

    /// Whether a run currently holds the guard.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Proof of holding the guard; dropping it releases the guard.
pub struct RunPermit {
    running: Arc<AtomicBool>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive() {
        let guard = RunGuard::new();

        let permit = guard.try_acquire().expect("first acquire");
        assert!(guard.is_running());
        assert!(guard.try_acquire().is_none());

        drop(permit);
        assert!(!guard.is_running());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let guard = RunGuard::new();
        let clone = guard.clone();

        let _permit = guard.try_acquire().expect("acquire");
        assert!(clone.try_acquire().is_none());
    }
}
