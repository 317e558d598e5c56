//! The plain mutex everything else in here sits on.
//!
//! `CondRwLock` keeps its state machine behind one and the `Aggregator` its
//! totals. A guard can be handed to a [`Condvar`](crate::Condvar), which
//! unlocks it for the duration of its sleep and locks it again afterwards.

use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use crate::raw::Mutex as RawMutex;

pub struct Mutex<T> {
    raw: RawMutex,
    value: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for Mutex<T> { }
unsafe impl<T: Send> Sync for Mutex<T> { }

impl<T> Mutex<T> {
    /// Usable in statics and other `const` initializers.
    pub const fn new(value: T) -> Mutex<T> {
        Mutex {
            raw: RawMutex::new(),
            value: UnsafeCell::new(value),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.raw.acquire();
        MutexGuard { owner: self }
    }

    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        if self.raw.try_acquire() {
            Some(MutexGuard { owner: self })
        } else {
            None
        }
    }

    /// No locking needed, `&mut self` already rules out other users.
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for Mutex<T> {
    fn default() -> Mutex<T> {
        Mutex::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Mutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_lock() {
            Some(guard) => f.debug_struct("Mutex").field("value", &*guard).finish(),
            None => f.write_str("Mutex { <locked> }"),
        }
    }
}

#[must_use]
pub struct MutexGuard<'a, T: 'a> {
    owner: &'a Mutex<T>,
}

impl<'a, T: 'a> MutexGuard<'a, T> {
    /// Unlocks and returns the mutex the guard came from.
    ///
    /// An associated function rather than a method so it can't be mistaken
    /// for something on `T` through `Deref`.
    pub(crate) fn unlock(guard: MutexGuard<'a, T>) -> &'a Mutex<T> {
        let owner = guard.owner;
        drop(guard);
        owner
    }
}

impl<'a, T: 'a> Drop for MutexGuard<'a, T> {
    fn drop(&mut self) {
        self.owner.raw.release();
    }
}

impl<'a, T: 'a> Deref for MutexGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.owner.value.get() }
    }
}

impl<'a, T: 'a> DerefMut for MutexGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.owner.value.get() }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use super::*;

    #[test]
    fn counts_under_contention() {
        let counter = Mutex::new(0u64);
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..10_000 {
                        *counter.lock() += 1;
                    }
                });
            }
        });
        assert_eq!(counter.into_inner(), 80_000);
    }

    #[test]
    fn try_lock_fails_while_held() {
        let m = Mutex::new(());
        let g = m.lock();
        assert!(m.try_lock().is_none());
        drop(g);
        assert!(m.try_lock().is_some());
    }

    #[test]
    fn unlock_hands_back_a_free_mutex() {
        let m = Mutex::new(vec![1]);
        let mut g = m.lock();
        g.push(2);
        let again = MutexGuard::unlock(g);
        assert!(std::ptr::eq(again, &m));
        assert_eq!(*again.try_lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn debug_shows_value_or_locked() {
        let mut m = Mutex::new(7);
        *m.get_mut() += 1;
        assert_eq!(format!("{:?}", m), "Mutex { value: 8 }");
        let _g = m.lock();
        assert_eq!(format!("{:?}", m), "Mutex { <locked> }");
    }
}
