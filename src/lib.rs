//! A sorted linked list hammered by threads under a reader-writer lock.
//!
//! Two locks are on offer: the platform's `pthread_rwlock_t` and
//! [`raw::CondRwLock`], a writer-preferring lock built from a futex mutex
//! and two futex condition variables. The [`harness`] seeds a
//! [`SortedList`], lets N [`workload::Worker`]s loose on it and reports how
//! long they took.

mod sys;
pub mod raw;
mod mutex;
mod condvar;
mod rwlock;

pub mod list;
pub mod aggregate;
pub mod workload;
pub mod config;
pub mod error;
pub mod harness;

pub use mutex::{Mutex, MutexGuard};
pub use condvar::Condvar;
pub use rwlock::{RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use list::SortedList;
pub use error::{BenchError, Result};
