//! crates/dermascan_core/src/in_flight.rs
//!
//! A flag-backed guard that admits one pending operation at a time.

use std::sync::atomic::{AtomicBool, Ordering};

/// Held for the duration of a pending operation; clears the flag on drop.
pub(crate) struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    /// Returns `None` when another operation already holds the flag.
    pub(crate) fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let flag = AtomicBool::new(false);
        let first = InFlight::try_acquire(&flag);
        assert!(first.is_some());
        assert!(InFlight::try_acquire(&flag).is_none());

        drop(first);
        assert!(InFlight::try_acquire(&flag).is_some());
    }
}
