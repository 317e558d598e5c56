use std::fmt::{Debug, Formatter, Result as FmtResult};
use crate::condvar::Condvar;
use crate::mutex::Mutex;
use super::RawRwLock;

/// A condition-variable based reader-writer lock that prefers writers.
///
/// To recap, the invariant is: Either multiple readers or a single writer.
///
/// A reader that shows up while a writer is active *or waiting* queues
/// behind it. That keeps a steady stream of readers from out-queuing a
/// writer forever: a writer waits at most for the readers that were already
/// inside when it arrived (plus whichever writers got there first).
///
/// This is not designed for direct use but as a building block for locks.
/// It does not know who holds what, so `release` trusts the caller.
pub struct CondRwLock {
    state: Mutex<LockState>,
    readers_go: Condvar,
    writer_go: Condvar,
}

struct LockState {
    readers_active: u32,
    writer_active: bool,
    writers_waiting: u32,
    readers_waiting: u32,
    admitted_reads: u64,
    admitted_writes: u64,
    read_waits: u64,
    write_waits: u64,
    max_reads_during_write_wait: u64,
}

/// Point-in-time view of a [`CondRwLock`].
///
/// The first four fields are the live state machine, the rest are
/// cumulative since the lock was created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LockStats {
    pub readers_active: u32,
    pub writer_active: bool,
    pub writers_waiting: u32,
    pub readers_waiting: u32,
    /// Read leases handed out.
    pub admitted_reads: u64,
    /// Write leases handed out.
    pub admitted_writes: u64,
    /// `acquire_read` calls that had to sleep at least once.
    pub read_waits: u64,
    /// `acquire_write` calls that had to sleep at least once.
    pub write_waits: u64,
    /// Most read leases handed out between a writer's arrival and its
    /// admission, over all writers so far.
    pub max_reads_during_write_wait: u64,
}

impl CondRwLock {
    /// Creates a new, idle instance.
    pub const fn new() -> CondRwLock {
        CondRwLock {
            state: Mutex::new(LockState {
                readers_active: 0,
                writer_active: false,
                writers_waiting: 0,
                readers_waiting: 0,
                admitted_reads: 0,
                admitted_writes: 0,
                read_waits: 0,
                write_waits: 0,
                max_reads_during_write_wait: 0,
            }),
            readers_go: Condvar::new(),
            writer_go: Condvar::new(),
        }
    }

    /// Acquires a read lease.
    ///
    /// This blocks while a writer holds the lock or is waiting for it.
    pub fn acquire_read(&self) {
        let mut state = self.state.lock();
        if state.writer_active || state.writers_waiting > 0 {
            state.read_waits += 1;
        }
        while state.writer_active || state.writers_waiting > 0 {
            state.readers_waiting += 1;
            state = self.readers_go.wait(state);
            state.readers_waiting -= 1;
        }
        state.readers_active += 1;
        state.admitted_reads += 1;
    }

    /// Acquires a write lease.
    ///
    /// This blocks while anyone else holds the lock.
    pub fn acquire_write(&self) {
        let mut state = self.state.lock();
        let arrived_at = state.admitted_reads;
        if state.writer_active || state.readers_active > 0 {
            state.write_waits += 1;
        }
        while state.writer_active || state.readers_active > 0 {
            state.writers_waiting += 1;
            state = self.writer_go.wait(state);
            state.writers_waiting -= 1;
        }
        state.writer_active = true;
        state.admitted_writes += 1;
        let overtaken_by = state.admitted_reads - arrived_at;
        if overtaken_by > state.max_reads_during_write_wait {
            state.max_reads_during_write_wait = overtaken_by;
        }
    }

    /// Releases whatever lease the caller holds.
    ///
    /// # Safety
    ///
    /// The caller must hold a lease obtained from `acquire_read` or
    /// `acquire_write` on this lock and must not use it afterwards.
    pub unsafe fn release(&self) {
        let mut state = self.state.lock();
        if state.writer_active {
            // a writer can only be active alone, so this is the writer leaving
            state.writer_active = false;
            if state.writers_waiting > 0 {
                self.writer_go.notify_one();
            } else if state.readers_waiting > 0 {
                self.readers_go.notify_all();
            }
        } else {
            debug_assert!(state.readers_active > 0, "release without a matching acquire");
            state.readers_active -= 1;
            if state.readers_active == 0 && state.writers_waiting > 0 {
                self.writer_go.notify_one();
            }
        }
    }

    /// Takes a snapshot of the state and the counters.
    pub fn stats(&self) -> LockStats {
        let state = self.state.lock();
        LockStats {
            readers_active: state.readers_active,
            writer_active: state.writer_active,
            writers_waiting: state.writers_waiting,
            readers_waiting: state.readers_waiting,
            admitted_reads: state.admitted_reads,
            admitted_writes: state.admitted_writes,
            read_waits: state.read_waits,
            write_waits: state.write_waits,
            max_reads_during_write_wait: state.max_reads_during_write_wait,
        }
    }
}

impl RawRwLock for CondRwLock {
    const NAME: &'static str = "custom";

    fn acquire_read(&self) {
        CondRwLock::acquire_read(self)
    }

    fn acquire_write(&self) {
        CondRwLock::acquire_write(self)
    }

    unsafe fn release(&self) {
        CondRwLock::release(self)
    }

    fn lock_stats(&self) -> Option<LockStats> {
        Some(self.stats())
    }
}

impl Default for CondRwLock {
    fn default() -> CondRwLock {
        CondRwLock::new()
    }
}

impl Debug for CondRwLock {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.debug_struct("CondRwLock").field("stats", &self.stats()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::thread;
    use std::time::Duration;
    use super::*;

    fn wait_until(lock: &CondRwLock, cond: impl Fn(&LockStats) -> bool) {
        for _ in 0..2000 {
            if cond(&lock.stats()) {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("lock never reached expected state: {:?}", lock.stats());
    }

    #[test]
    fn readers_share() {
        let lock = CondRwLock::new();
        lock.acquire_read();
        lock.acquire_read();
        let stats = lock.stats();
        assert_eq!(stats.readers_active, 2);
        assert!(!stats.writer_active);
        assert_eq!(stats.read_waits, 0);
        unsafe {
            lock.release();
            lock.release();
        }
        assert_eq!(lock.stats().readers_active, 0);
    }

    #[test]
    fn writer_is_exclusive() {
        let lock = CondRwLock::new();
        let inside = AtomicU32::new(0);
        let readers_seen_writer = AtomicBool::new(false);

        thread::scope(|s| {
            for rank in 0..8 {
                let lock = &lock;
                let inside = &inside;
                let readers_seen_writer = &readers_seen_writer;
                s.spawn(move || {
                    for i in 0..2000 {
                        if (i + rank) % 4 == 0 {
                            lock.acquire_write();
                            assert_eq!(inside.swap(u32::MAX, Ordering::SeqCst), 0);
                            let stats = lock.stats();
                            assert!(stats.writer_active);
                            assert_eq!(stats.readers_active, 0);
                            inside.store(0, Ordering::SeqCst);
                        } else {
                            lock.acquire_read();
                            if inside.fetch_add(1, Ordering::SeqCst) == u32::MAX {
                                readers_seen_writer.store(true, Ordering::SeqCst);
                            }
                            inside.fetch_sub(1, Ordering::SeqCst);
                        }
                        unsafe { lock.release() };
                    }
                });
            }
        });

        assert!(!readers_seen_writer.load(Ordering::SeqCst));
        let stats = lock.stats();
        assert_eq!(stats.admitted_reads + stats.admitted_writes, 8 * 2000);
        assert_eq!(stats.readers_active, 0);
        assert!(!stats.writer_active);
    }

    #[test]
    fn waiting_writer_blocks_new_readers() {
        let lock = CondRwLock::new();
        let order = Mutex::new(Vec::new());

        lock.acquire_read();
        thread::scope(|s| {
            s.spawn(|| {
                lock.acquire_write();
                order.lock().push("writer");
                unsafe { lock.release() };
            });
            wait_until(&lock, |st| st.writers_waiting == 1);

            s.spawn(|| {
                lock.acquire_read();
                order.lock().push("reader");
                unsafe { lock.release() };
            });
            wait_until(&lock, |st| st.readers_waiting == 1);

            // the late reader must not sneak in next to us
            assert_eq!(lock.stats().readers_active, 1);
            unsafe { lock.release() };
        });

        assert_eq!(*order.lock(), vec!["writer", "reader"]);
        let stats = lock.stats();
        assert_eq!(stats.write_waits, 1);
        assert_eq!(stats.read_waits, 1);
        assert_eq!(stats.max_reads_during_write_wait, 0);
    }

    #[test]
    fn writer_not_starved_by_readers() {
        let lock = CondRwLock::new();
        let stop = AtomicBool::new(false);

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    while !stop.load(Ordering::Relaxed) {
                        lock.acquire_read();
                        thread::sleep(Duration::from_micros(200));
                        unsafe { lock.release() };
                    }
                });
            }
            // don't start writing before the readers are streaming
            wait_until(&lock, |st| st.admitted_reads >= 100 && st.readers_active > 0);

            for _ in 0..200 {
                lock.acquire_write();
                let during = lock.stats();
                assert!(during.writer_active);
                assert_eq!(during.readers_active, 0);
                unsafe { lock.release() };
            }
            stop.store(true, Ordering::Relaxed);
        });

        let stats = lock.stats();
        assert_eq!(stats.admitted_writes, 200);
        assert!(stats.admitted_reads >= 100);
        assert!(stats.write_waits > 0, "writer never had to queue: {:?}", stats);
        // nobody got in while the writer was queued
        assert_eq!(stats.max_reads_during_write_wait, 0);
    }
}
