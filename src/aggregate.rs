use std::fmt;
use std::ops::AddAssign;

use crate::mutex::Mutex;
use crate::workload::OpKind;

/// Per-class operation counts. These count attempts: an insert of a key
/// that was already there is still an insert.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpCounts {
    pub searches: u64,
    pub inserts: u64,
    pub deletes: u64,
}

impl OpCounts {
    #[inline]
    pub fn record(&mut self, op: OpKind) {
        match op {
            OpKind::Search => self.searches += 1,
            OpKind::Insert => self.inserts += 1,
            OpKind::Delete => self.deletes += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.searches + self.inserts + self.deletes
    }
}

impl AddAssign<&OpCounts> for OpCounts {
    fn add_assign(&mut self, other: &OpCounts) {
        self.searches += other.searches;
        self.inserts += other.inserts;
        self.deletes += other.deletes;
    }
}

impl fmt::Display for OpCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member={} insert={} delete={}", self.searches, self.inserts, self.deletes)
    }
}

/// Shared totals, merged into once by every worker when it's done.
///
/// It has its own mutex and never takes the list lock, so the two can't
/// deadlock against each other.
#[derive(Debug, Default)]
pub struct Aggregator {
    totals: Mutex<OpCounts>,
}

impl Aggregator {
    pub const fn new() -> Aggregator {
        Aggregator {
            totals: Mutex::new(OpCounts { searches: 0, inserts: 0, deletes: 0 }),
        }
    }

    pub fn merge(&self, local: &OpCounts) {
        *self.totals.lock() += local;
    }

    pub fn totals(&self) -> OpCounts {
        *self.totals.lock()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use super::*;

    #[test]
    fn record_and_total() {
        let mut c = OpCounts::default();
        c.record(OpKind::Search);
        c.record(OpKind::Search);
        c.record(OpKind::Delete);
        assert_eq!(c, OpCounts { searches: 2, inserts: 0, deletes: 1 });
        assert_eq!(c.total(), 3);
        assert_eq!(c.to_string(), "member=2 insert=0 delete=1");
    }

    #[test]
    fn merges_from_many_threads() {
        let agg = Aggregator::new();
        thread::scope(|s| {
            for i in 0..16u64 {
                let agg = &agg;
                s.spawn(move || agg.merge(&OpCounts { searches: i, inserts: 1, deletes: 2 }));
            }
        });
        assert_eq!(agg.totals(), OpCounts { searches: 120, inserts: 16, deletes: 32 });
    }
}
