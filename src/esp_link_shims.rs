//! ESP-IDF runtime symbol providers for third-party crates.
//!
//! `embassy-sync`'s `CriticalSectionRawMutex` needs a `critical-section`
//! implementation; on host the crate's `std` feature supplies one.

use core::cell::{Cell, RefCell};
use std::sync::{Mutex, MutexGuard, PoisonError};

static CRITICAL_SECTION_MUTEX: Mutex<()> = Mutex::new(());

thread_local! {
    static CRITICAL_SECTION_DEPTH: Cell<u8> = const { Cell::new(0) };
    static CRITICAL_SECTION_GUARD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
}

/// Runtime-backed critical-section acquire used by `critical-section` 1.x.
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
    CRITICAL_SECTION_DEPTH.with(|depth| {
        CRITICAL_SECTION_GUARD.with(|guard| {
            let d = depth.get();
            if d == 0 {
                // A poisoned lock still excludes.
                let lock = CRITICAL_SECTION_MUTEX
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                *guard.borrow_mut() = Some(lock);
            }
            let new_depth = d.saturating_add(1);
            depth.set(new_depth);
            new_depth
        })
    })
}

/// Runtime-backed critical-section release used by `critical-section` 1.x.
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_release(_token: u8) {
    CRITICAL_SECTION_DEPTH.with(|depth| {
        CRITICAL_SECTION_GUARD.with(|guard| {
            let d = depth.get();
            if d == 0 {
                return;
            }
            let new_depth = d - 1;
            depth.set(new_depth);
            if new_depth == 0 {
                *guard.borrow_mut() = None;
            }
        })
    })
}
