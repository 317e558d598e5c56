mod futex;
mod cond_rwlock;
mod pthread;

pub use self::futex::Futex as Mutex;
pub use self::cond_rwlock::{CondRwLock, LockStats};
pub use self::pthread::PthreadRwLock;

/// The three operations every reader-writer lock in here offers.
///
/// Implementations don't track who holds a lease, which is why `release`
/// is unsafe. [`crate::RwLock`] pairs them up for you.
pub trait RawRwLock: Default + Send + Sync {
    /// Short name used in reports.
    const NAME: &'static str;

    /// Blocks until the caller holds a shared lease.
    fn acquire_read(&self);

    /// Blocks until the caller holds an exclusive lease.
    fn acquire_write(&self);

    /// Gives up the lease the caller holds and wakes whoever may proceed.
    ///
    /// # Safety
    ///
    /// Must be called exactly once per successful acquire, by the thread
    /// holding that lease.
    unsafe fn release(&self);

    /// Wait and admission statistics, for locks that keep them.
    fn lock_stats(&self) -> Option<LockStats> {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;
    use std::sync::Arc;
    use super::*;

    #[test]
    fn contended_mutex_hands_over() {
        let futex = Arc::new(Mutex::new());
        futex.acquire();
        assert!(!futex.try_acquire());

        let futex2 = futex.clone();
        let waiter = thread::spawn(move || {
            // sleeps in the slow path until we let go
            futex2.acquire();
            futex2.release();
        });
        thread::sleep(Duration::from_millis(50));
        futex.release();
        waiter.join().unwrap();

        assert!(futex.try_acquire());
        futex.release();
    }

    fn readers_then_writer<R: RawRwLock + 'static>() {
        let lock = Arc::new(R::default());
        let lock2 = lock.clone();
        lock.acquire_read();
        lock.acquire_read();
        lock.acquire_read();
        let writer = thread::spawn(move || {
            lock2.acquire_read();
            unsafe { lock2.release() };
            lock2.acquire_write();
            thread::sleep(Duration::from_millis(100));
            unsafe { lock2.release() };
        });
        unsafe {
            lock.release();
            lock.release();
            lock.release();
        }
        writer.join().unwrap();
        lock.acquire_read();
        unsafe { lock.release() };
        lock.acquire_write();
        unsafe { lock.release() };
    }

    #[test]
    fn cond_rwlock() {
        readers_then_writer::<CondRwLock>();
    }

    #[test]
    fn pthread_rwlock() {
        readers_then_writer::<PthreadRwLock>();
    }
}
