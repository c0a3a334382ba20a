//! Session guard: device-wide admission for playback sessions.
//!
//! Admission runs on the scan context and must never block, so the guard is
//! a single atomic flag claimed by compare-exchange. The worker that runs
//! the admitted session owns the release.

use core::sync::atomic::{AtomicBool, Ordering};

/// Observable state of the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No session; the next request is admitted.
    Idle,
    /// A session is admitted or running; requests are refused.
    Playing,
}

/// Single-slot occupancy flag.
#[derive(Debug, Default)]
pub struct SessionGuard {
    occupied: AtomicBool,
}

impl SessionGuard {
    /// A guard in [`SessionState::Idle`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            occupied: AtomicBool::new(false),
        }
    }

    /// Claim the slot. Returns `false`, with no state change, if a session
    /// already holds it.
    pub fn try_acquire(&self) -> bool {
        self.occupied
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Free the slot.
    pub fn release(&self) {
        self.occupied.store(false, Ordering::Release);
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.occupied.load(Ordering::Acquire) {
            SessionState::Playing
        } else {
            SessionState::Idle
        }
    }

    /// Tie the release of an admitted session to a scope.
    ///
    /// The slot is freed when the returned value drops, whichever way the
    /// session ends.
    #[must_use = "the slot is released as soon as this value is dropped"]
    pub fn release_on_drop(&self) -> ReleaseOnDrop<'_> {
        ReleaseOnDrop { guard: self }
    }
}

/// Frees the [`SessionGuard`] slot on drop.
#[derive(Debug)]
pub struct ReleaseOnDrop<'a> {
    guard: &'a SessionGuard,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.guard.release();
        tracing::debug!("session guard released");
    }
}
