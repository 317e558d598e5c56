//! What a single benchmark thread does.

use tracing::debug;

use crate::aggregate::{Aggregator, OpCounts};
use crate::list::SortedList;
use crate::raw::RawRwLock;
use crate::rwlock::RwLock;

/// Keys are drawn from `0..MAX_KEY`.
pub const MAX_KEY: u32 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Search,
    Insert,
    Delete,
}

/// How the operations are split. Deletes get whatever is left over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpMix {
    pub search: f64,
    pub insert: f64,
}

impl OpMix {
    pub fn new(search: f64, insert: f64) -> OpMix {
        OpMix { search, insert }
    }

    pub fn delete(&self) -> f64 {
        1.0 - (self.search + self.insert)
    }

    /// Maps a draw from `[0, 1)` to an operation.
    #[inline]
    pub fn classify(&self, draw: f64) -> OpKind {
        if draw < self.search {
            OpKind::Search
        } else if draw < self.search + self.insert {
            OpKind::Insert
        } else {
            OpKind::Delete
        }
    }
}

/// Operations for thread `rank` out of `threads` when `total` are to be run.
///
/// Everyone gets `total / threads`, the last thread also takes the remainder.
pub fn ops_for_thread(total: u64, threads: usize, rank: usize) -> u64 {
    let threads = threads as u64;
    let share = total / threads;
    if rank as u64 + 1 == threads {
        share + total % threads
    } else {
        share
    }
}

/// Everything the workers share, handed to each of them at spawn time.
pub struct Shared<R: RawRwLock> {
    pub list: RwLock<SortedList, R>,
    pub totals: Aggregator,
    pub mix: OpMix,
}

impl<R: RawRwLock> Shared<R> {
    pub fn new(list: SortedList, mix: OpMix) -> Shared<R> {
        Shared {
            list: RwLock::new(list),
            totals: Aggregator::new(),
            mix,
        }
    }
}

/// One benchmark thread's share of the work.
pub struct Worker {
    rank: usize,
    ops: u64,
    rng: fastrand::Rng,
}

impl Worker {
    pub fn new(rank: usize, ops: u64, seed: u64) -> Worker {
        Worker {
            rank,
            ops,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Runs all operations against `shared`, merges and returns the local counts.
    pub fn run<R: RawRwLock>(mut self, shared: &Shared<R>) -> OpCounts {
        debug!(rank = self.rank, ops = self.ops, "worker started");
        let mut counts = OpCounts::default();

        for _ in 0..self.ops {
            let op = shared.mix.classify(self.rng.f64());
            let key = self.rng.u32(0..MAX_KEY);
            match op {
                OpKind::Search => {
                    shared.list.read().member(key);
                }
                OpKind::Insert => {
                    shared.list.write().insert(key);
                }
                OpKind::Delete => {
                    shared.list.write().delete(key);
                }
            }
            counts.record(op);
        }

        shared.totals.merge(&counts);
        debug!(rank = self.rank, %counts, "worker done");
        counts
    }
}
