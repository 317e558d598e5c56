use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::atomic::{AtomicU32, Ordering};
use crate::mutex::MutexGuard;
use crate::sys::{futex_wait, futex_wake};

/// A condition variable on top of a single futex word.
///
/// The word is a notification counter: `wait` samples it while still holding
/// the mutex and only sleeps if nobody bumped it since. A notifier always
/// bumps before waking, so a notification sent between our unlock and our
/// sleep makes the sleep return right away instead of getting lost.
///
/// Wakeups may be spurious; callers re-check their predicate in a loop.
pub struct Condvar {
    counter: AtomicU32,
}

impl Condvar {
    pub const fn new() -> Condvar {
        Condvar { counter: AtomicU32::new(0) }
    }

    /// Wakes one waiter, if any.
    pub fn notify_one(&self) {
        self.counter.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = futex_wake(&self.counter, 1) {
            panic!("futex wake failed: {}", e);
        }
    }

    /// Wakes every waiter.
    pub fn notify_all(&self) {
        self.counter.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = futex_wake(&self.counter, i32::MAX as u32) {
            panic!("futex wake failed: {}", e);
        }
    }

    /// Unlocks the guard's mutex, sleeps until notified and locks it again.
    pub fn wait<'a, T>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        let seen = self.counter.load(Ordering::Relaxed);

        let mutex = MutexGuard::unlock(guard);

        if let Err(e) = futex_wait(&self.counter, seen) {
            panic!("futex wait failed: {}", e);
        }

        mutex.lock()
    }
}

impl Default for Condvar {
    fn default() -> Condvar {
        Condvar::new()
    }
}

impl Debug for Condvar {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "Condvar@{:p} (={})", &self.counter as *const _, self.counter.load(Ordering::SeqCst))
    }
}
