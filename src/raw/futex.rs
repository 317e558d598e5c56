use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::atomic::{AtomicU32, Ordering};
use crate::sys::{futex_wait, futex_wake};

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
const CONTENDED: u32 = 2;

/// A simple mutual exclusion lock (mutex).
///
/// This is not designed for direct use but as a building block for locks.
///
/// Thus, it is not reentrant and it may misbehave if used incorrectly
/// (i.e. you can release even if someone else is holding it).
/// It's also not fair.
pub struct Futex {
    futex: AtomicU32,
}

impl Futex {
    /// Creates a new, unlocked instance.
    pub const fn new() -> Futex {
        Futex { futex: AtomicU32::new(UNLOCKED) }
    }

    /// Acquires the lock.
    ///
    /// This blocks until the lock is ours.
    #[inline]
    pub fn acquire(&self) {
        if self.futex
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.acquire_slow();
        }
    }

    #[cold]
    #[inline(never)]
    fn acquire_slow(&self) {
        // once contended, we leave CONTENDED behind so the holder knows to wake someone
        while self.futex.swap(CONTENDED, Ordering::Acquire) != UNLOCKED {
            if let Err(e) = futex_wait(&self.futex, CONTENDED) {
                panic!("futex wait failed: {}", e);
            }
        }
    }

    /// Attempts to acquire the lock without blocking.
    ///
    /// Returns `true` if the lock was acquired, `false` otherwise.
    #[inline]
    pub fn try_acquire(&self) -> bool {
        self.futex
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Releases the lock.
    #[inline]
    pub fn release(&self) {
        if self.futex.swap(UNLOCKED, Ordering::Release) == CONTENDED {
            // somebody is (probably) asleep - wake exactly one, it re-marks CONTENDED
            if let Err(e) = futex_wake(&self.futex, 1) {
                panic!("futex wake failed: {}", e);
            }
        }
    }
}

impl Default for Futex {
    fn default() -> Futex {
        Futex::new()
    }
}

impl Debug for Futex {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "Futex@{:p} (={})", &self.futex as *const _, self.futex.load(Ordering::SeqCst))
    }
}
