//! Fail-fast exclusive region.
//!
//! A single-slot guard over some physical resource.  Entry either succeeds
//! immediately or is rejected immediately with the owner's busy error;
//! nothing ever waits or queues.
//!
//! ```text
//!   enter() ──ok──▶ RegionGuard ──drop──▶ free
//!      │
//!      └──busy──▶ Err(E::from(RegionIsBusy))
//! ```
//!
//! The busy flag is an [`AtomicBool`] flipped with a single
//! compare-exchange, so the check and the set cannot be separated by a
//! suspension point (async callers) or a preemption (thread callers).

use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

/// Rejection raised when the region is already held.
///
/// Owners convert it into their own error kind via `From`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionIsBusy {
    /// Name of the guarded resource, e.g. `"ATX controller"`.
    pub region: &'static str,
}

impl fmt::Display for RegionIsBusy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} busy", self.region)
    }
}

/// Single-slot mutual-exclusion guard that never blocks.
///
/// `E` is the error kind [`enter`](Self::enter) rejects with.
pub struct ExclusiveRegion<E> {
    name: &'static str,
    busy: AtomicBool,
    _kind: PhantomData<fn() -> E>,
}

impl<E: From<RegionIsBusy>> ExclusiveRegion<E> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            busy: AtomicBool::new(false),
            _kind: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current occupancy.  Never blocks and has no side effects.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Atomically take the region.
    ///
    /// The returned guard frees the region exactly once when dropped,
    /// whether the holder finished, failed, or was cancelled.
    pub fn enter(&self) -> Result<RegionGuard<'_>, E> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| RegionGuard { busy: &self.busy })
            .map_err(|_| E::from(RegionIsBusy { region: self.name }))
    }
}

/// Proof of holding an [`ExclusiveRegion`].  Releases on drop.
#[must_use = "the region is released as soon as the guard is dropped"]
pub struct RegionGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for RegionGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
