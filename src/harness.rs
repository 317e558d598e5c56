//! Seeds the list, runs the workers, collects the report.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::aggregate::OpCounts;
use crate::config::{BenchConfig, LockChoice};
use crate::list::SortedList;
use crate::raw::{CondRwLock, LockStats, PthreadRwLock, RawRwLock};
use crate::workload::{ops_for_thread, Shared, Worker, MAX_KEY};

/// Outcome of one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Which lock was used, see [`RawRwLock::NAME`].
    pub lock: &'static str,
    /// Configured operations over all threads.
    pub total_ops: u64,
    /// What the workers actually reported.
    pub counts: OpCounts,
    pub elapsed: Duration,
    /// Workers that never ran or died, their operations are missing from `counts`.
    pub failed_workers: usize,
    pub final_len: usize,
    pub final_sorted: bool,
    /// Only our own lock keeps these.
    pub lock_stats: Option<LockStats>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.lock == CondRwLock::NAME { "[MY] " } else { "" };
        writeln!(f, "{}Elapsed time = {} seconds", prefix, Scientific(self.elapsed.as_secs_f64()))?;
        writeln!(f, "{}Total ops = {}", prefix, self.total_ops)?;
        writeln!(f, "{}member ops = {}", prefix, self.counts.searches)?;
        writeln!(f, "{}insert ops = {}", prefix, self.counts.inserts)?;
        write!(f, "{}delete ops = {}", prefix, self.counts.deletes)
    }
}

/// `printf("%e")` layout: six decimals and an exponent of at least two digits
/// with its sign, e.g. `1.500000e+00`. Rust's `{:e}` would print `1.5e0`.
struct Scientific(f64);

impl fmt::Display for Scientific {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = format!("{:.6e}", self.0);
        match formatted.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                write!(f, "{}e{}{:0>2}", mantissa, sign, digits)
            }
            // inf and NaN have no exponent
            None => f.write_str(&formatted),
        }
    }
}

/// Insert attempts allowed when seeding `target` keys.
pub fn seed_attempt_budget(target: u64) -> u64 {
    target.saturating_mul(2)
}

/// Seed for worker `rank`: `base + rank + 1`, wrapping around at `u64::MAX`.
pub fn worker_seed(base: u64, rank: usize) -> u64 {
    base.wrapping_add(rank as u64).wrapping_add(1)
}

/// Tries to insert `target` random keys, giving up after
/// [`seed_attempt_budget`] attempts.
///
/// Returns the number of keys actually inserted.
pub fn seed_list(list: &mut SortedList, target: u64, seed: u64) -> u64 {
    let mut rng = fastrand::Rng::with_seed(seed);
    let budget = seed_attempt_budget(target);
    let mut inserted = 0;
    let mut attempts = 0;
    while inserted < target && attempts < budget {
        if list.insert(rng.u32(0..MAX_KEY)) {
            inserted += 1;
        }
        attempts += 1;
    }
    inserted
}

/// Builds the seeded starting list for a run.
pub fn seeded_list(config: &BenchConfig) -> SortedList {
    let mut list = SortedList::new();
    let inserted = seed_list(&mut list, config.inserts_in_main, config.seed.wrapping_add(1));
    println!("Inserted {} keys in empty list", inserted);
    if inserted < config.inserts_in_main {
        warn!(inserted, target = config.inserts_in_main, "seeding gave up before reaching the target");
    }
    list
}

/// Runs the benchmark once with lock `R`, starting from `list`.
pub fn run_with<R: RawRwLock + 'static>(config: &BenchConfig, list: SortedList) -> RunReport {
    println!("Rwlock implementation: {}", R::NAME);
    if config.show_list {
        println!("Before starting threads, list = \n{}\n", list);
    }

    let shared: Arc<Shared<R>> = Arc::new(Shared::new(list, config.mix));
    info!(threads = config.threads, ops = config.total_ops, lock = R::NAME, "starting workers");

    let start = Instant::now();
    let mut handles = Vec::with_capacity(config.threads);
    let mut failed_workers = 0;
    for rank in 0..config.threads {
        let ops = ops_for_thread(config.total_ops, config.threads, rank);
        let worker = Worker::new(rank, ops, worker_seed(config.seed, rank));
        let shared = Arc::clone(&shared);
        let spawned = thread::Builder::new()
            .name(format!("worker-{}", rank))
            .spawn(move || worker.run(&shared));
        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                error!(rank, ops, "failed to spawn worker thread: {}", e);
                failed_workers += 1;
            }
        }
    }

    for handle in handles {
        let name = handle.thread().name().unwrap_or("worker").to_owned();
        match handle.join() {
            Ok(counts) => debug!(worker = %name, %counts, "joined"),
            Err(_) => {
                error!(worker = %name, "worker thread panicked");
                failed_workers += 1;
            }
        }
    }
    let elapsed = start.elapsed();

    let counts = shared.totals.totals();
    let lock_stats = shared.list.raw().lock_stats();
    let list = shared.list.read();
    let report = RunReport {
        lock: R::NAME,
        total_ops: config.total_ops,
        counts,
        elapsed,
        failed_workers,
        final_len: list.len(),
        final_sorted: list.is_strictly_increasing(),
        lock_stats,
    };
    if config.show_list {
        println!("After threads terminate, list = \n{}\n", *list);
    }
    drop(list);

    if !report.final_sorted {
        error!(lock = R::NAME, "list lost its ordering during the run");
    }
    if counts.total() != config.total_ops {
        warn!(
            expected = config.total_ops,
            got = counts.total(),
            failed_workers,
            "operation count does not add up"
        );
    }
    if let Some(stats) = &report.lock_stats {
        debug!(?stats, "lock statistics");
    }
    info!(lock = R::NAME, final_len = report.final_len, "run finished");
    report
}

/// Runs whatever lock(s) the config asks for, each from a freshly seeded list.
pub fn run(config: &BenchConfig) -> Vec<RunReport> {
    let locks: &[LockChoice] = match config.lock {
        LockChoice::Both => &[LockChoice::Pthread, LockChoice::Custom],
        LockChoice::Pthread => &[LockChoice::Pthread],
        LockChoice::Custom => &[LockChoice::Custom],
    };

    locks
        .iter()
        .map(|choice| {
            let list = seeded_list(config);
            match choice {
                LockChoice::Custom => run_with::<CondRwLock>(config, list),
                _ => run_with::<PthreadRwLock>(config, list),
            }
        })
        .collect()
}
