//! Nestable, interrupt-safe critical section guard.
//!
//! Built on the `critical-section` crate: each target registers its
//! interrupt-mask implementation with `critical_section::set_impl!`, and
//! host builds enable the `std` feature. Entering saves the previous mask
//! state and leaving restores exactly that state, so nested guards work
//! without a counter as long as they are released in reverse order of
//! acquisition. Lexical scoping of [`CriticalSectionGuard`] enforces that.
//!
//! Keep the guarded window short: one counter read plus one state update.

use critical_section::{CriticalSection, RestoreState};
use std::marker::PhantomData;

/// RAII guard holding the critical section.
///
/// Released on drop, including during unwinding. Not `Send`: the saved
/// mask state belongs to the context that acquired it.
#[must_use = "the critical section is released as soon as the guard is dropped"]
pub struct CriticalSectionGuard {
    restore: RestoreState,
    _not_send: PhantomData<*mut ()>,
}

impl CriticalSectionGuard {
    /// Enter the critical section, saving the current mask state.
    pub fn enter() -> Self {
        // SAFETY: the matching `release` runs in `Drop` with this exact
        // token. The guard is neither `Send` nor `Clone`, and nested guards
        // drop in reverse order of creation.
        let restore = unsafe { critical_section::acquire() };
        Self {
            restore,
            _not_send: PhantomData,
        }
    }

    /// Token proving the critical section is held, valid while `self` lives.
    pub fn token(&self) -> CriticalSection<'_> {
        // SAFETY: the section stays acquired until `self` is dropped, and
        // the token's lifetime is tied to `&self`.
        unsafe { CriticalSection::new() }
    }
}

impl Drop for CriticalSectionGuard {
    fn drop(&mut self) {
        // SAFETY: `restore` came from the `acquire` in `enter` and is
        // released exactly once.
        unsafe { critical_section::release(self.restore) };
    }
}

impl std::fmt::Debug for CriticalSectionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriticalSectionGuard").finish_non_exhaustive()
    }
}

/// Run `f` inside the critical section.
pub fn with_critical_section<R>(f: impl FnOnce(CriticalSection<'_>) -> R) -> R {
    let guard = CriticalSectionGuard::enter();
    f(guard.token())
}
