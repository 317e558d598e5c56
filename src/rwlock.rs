use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use crate::raw::{CondRwLock, RawRwLock};

/// A value behind a reader-writer lock of your choosing.
///
/// Defaults to our own writer-preferring [`CondRwLock`].
pub struct RwLock<T, R: RawRwLock = CondRwLock> {
    rwlock: R,
    data: UnsafeCell<T>,
}

unsafe impl<T: Send + Sync, R: RawRwLock> Send for RwLock<T, R> {}
unsafe impl<T: Send + Sync, R: RawRwLock> Sync for RwLock<T, R> {}

impl<T, R: RawRwLock> RwLock<T, R> {
    pub fn new(t: T) -> RwLock<T, R> {
        RwLock {
            rwlock: R::default(),
            data: UnsafeCell::new(t),
        }
    }

    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, T, R> {
        self.rwlock.acquire_read();
        RwLockReadGuard { rwlock: self }
    }

    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, T, R> {
        self.rwlock.acquire_write();
        RwLockWriteGuard { rwlock: self }
    }

    /// The underlying lock, e.g. to look at its statistics.
    pub fn raw(&self) -> &R {
        &self.rwlock
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: Default, R: RawRwLock> Default for RwLock<T, R> {
    fn default() -> RwLock<T, R> {
        RwLock::new(Default::default())
    }
}

#[must_use]
pub struct RwLockReadGuard<'a, T: 'a, R: RawRwLock + 'a> {
    rwlock: &'a RwLock<T, R>
}

#[must_use]
pub struct RwLockWriteGuard<'a, T: 'a, R: RawRwLock + 'a> {
    rwlock: &'a RwLock<T, R>
}

impl<'a, T: 'a, R: RawRwLock + 'a> Drop for RwLockReadGuard<'a, T, R> {
    fn drop(&mut self) {
        unsafe { self.rwlock.rwlock.release() };
    }
}

impl<'a, T: 'a, R: RawRwLock + 'a> Drop for RwLockWriteGuard<'a, T, R> {
    fn drop(&mut self) {
        unsafe { self.rwlock.rwlock.release() };
    }
}

impl<'a, T: 'a, R: RawRwLock + 'a> Deref for RwLockReadGuard<'a, T, R> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.rwlock.data.get() }
    }
}

impl<'a, T: 'a, R: RawRwLock + 'a> Deref for RwLockWriteGuard<'a, T, R> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.rwlock.data.get() }
    }
}

impl<'a, T: 'a, R: RawRwLock + 'a> DerefMut for RwLockWriteGuard<'a, T, R> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.rwlock.data.get() }
    }
}
