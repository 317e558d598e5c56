use std::cell::UnsafeCell;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::io;
use super::RawRwLock;

/// The platform's `pthread_rwlock_t`, behind the same interface as our own lock.
///
/// pthread objects must not move once in use, so the lock lives in a `Box`
/// and only the box pointer moves with us. Its fairness policy is whatever
/// the libc picked (glibc prefers readers by default).
pub struct PthreadRwLock {
    lock: Box<UnsafeCell<libc::pthread_rwlock_t>>,
}

unsafe impl Send for PthreadRwLock {}
unsafe impl Sync for PthreadRwLock {}

#[cold]
#[inline(never)]
fn die(op: &str, code: libc::c_int) -> ! {
    panic!("{} failed: {}", op, io::Error::from_raw_os_error(code));
}

impl PthreadRwLock {
    /// Creates a new instance with default attributes.
    pub fn new() -> PthreadRwLock {
        PthreadRwLock {
            lock: Box::new(UnsafeCell::new(libc::PTHREAD_RWLOCK_INITIALIZER)),
        }
    }

    /// Acquires a read lock.
    pub fn acquire_read(&self) {
        let ret = unsafe { libc::pthread_rwlock_rdlock(self.lock.get()) };
        if ret != 0 {
            die("pthread_rwlock_rdlock", ret);
        }
    }

    /// Acquires a write lock.
    pub fn acquire_write(&self) {
        let ret = unsafe { libc::pthread_rwlock_wrlock(self.lock.get()) };
        if ret != 0 {
            die("pthread_rwlock_wrlock", ret);
        }
    }

    /// Releases whatever lock the caller holds.
    ///
    /// # Safety
    ///
    /// The calling thread must hold a read or write lock on this instance.
    /// Unlocking a lock you don't hold is undefined behavior for pthreads.
    pub unsafe fn release(&self) {
        let ret = libc::pthread_rwlock_unlock(self.lock.get());
        if ret != 0 {
            die("pthread_rwlock_unlock", ret);
        }
    }
}

impl RawRwLock for PthreadRwLock {
    const NAME: &'static str = "pthread";

    fn acquire_read(&self) {
        PthreadRwLock::acquire_read(self)
    }

    fn acquire_write(&self) {
        PthreadRwLock::acquire_write(self)
    }

    unsafe fn release(&self) {
        PthreadRwLock::release(self)
    }
}

impl Default for PthreadRwLock {
    fn default() -> PthreadRwLock {
        PthreadRwLock::new()
    }
}

impl Drop for PthreadRwLock {
    fn drop(&mut self) {
        // we have &mut, so nobody can be holding it
        unsafe { libc::pthread_rwlock_destroy(self.lock.get()) };
    }
}

impl Debug for PthreadRwLock {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "PthreadRwLock@{:p}", self.lock.get())
    }
}
