// src/pool/mod.rs
//! Bounded worker pool for fanning out independent raw-source fetches
//!
//! Optional infrastructure around the engine: the reconciliation itself is
//! synchronous and single-threaded per invocation. The pool enforces a
//! maximum concurrency and one wall-clock deadline across the whole batch,
//! collects best-effort whichever tasks completed in time, and returns
//! results correlated to their submission index regardless of completion
//! order. Tasks that outlive the deadline are not forcibly terminated;
//! their results are omitted and reported as issues.

use crate::api::phases;
use crate::issues::IssueLedger;
use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_workers: usize,
    /// One deadline for the whole batch, not per task.
    pub batch_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4),
            batch_timeout: Duration::from_secs(30),
        }
    }
}

/// Run a batch of independent tasks under the pool's limits.
///
/// The result vector has one slot per submitted task, in submission
/// order; a `None` slot means that task did not complete before the batch
/// deadline. Every worker handle is released on the exit path: joined
/// when the batch completed, detached (dropped) when stragglers remain.
pub fn run_batch<T, F>(tasks: Vec<F>, config: &PoolConfig, issues: &IssueLedger) -> Vec<Option<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let total = tasks.len();
    if total == 0 {
        return Vec::new();
    }

    let queue: Arc<Mutex<VecDeque<(usize, F)>>> =
        Arc::new(Mutex::new(tasks.into_iter().enumerate().collect()));
    let (tx, rx) = mpsc::channel::<(usize, T)>();

    let worker_count = config.max_workers.max(1).min(total);
    let mut handles = Vec::with_capacity(worker_count);

    for _ in 0..worker_count {
        let queue = Arc::clone(&queue);
        let tx = tx.clone();

        handles.push(thread::spawn(move || loop {
            let job = match queue.lock() {
                Ok(mut q) => q.pop_front(),
                Err(_) => None,
            };

            match job {
                Some((index, task)) => {
                    let output = task();
                    // Receiver gone means the batch deadline passed.
                    if tx.send((index, output)).is_err() {
                        break;
                    }
                }
                None => break,
            }
        }));
    }
    drop(tx);

    let deadline = Instant::now() + config.batch_timeout;
    let mut results: Vec<Option<T>> = Vec::with_capacity(total);
    results.resize_with(total, || None);
    let mut completed = 0;

    while completed < total {
        let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
            break;
        };

        match rx.recv_timeout(remaining) {
            Ok((index, output)) => {
                results[index] = Some(output);
                completed += 1;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => break,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    drop(rx);

    if completed < total {
        for (index, slot) in results.iter().enumerate() {
            if slot.is_none() {
                issues.warning(
                    phases::POOL,
                    format!("task {} did not complete before the batch deadline", index),
                );
            }
        }
        // Stragglers keep running detached; their handles are dropped here.
        drop(handles);
    } else {
        for handle in handles {
            let _ = handle.join();
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(workers: usize, timeout_ms: u64) -> PoolConfig {
        PoolConfig {
            max_workers: workers,
            batch_timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[test]
    fn test_results_correlate_to_submission_index() {
        let issues = IssueLedger::new();
        let tasks: Vec<_> = (0..16usize)
            .map(|i| {
                move || {
                    // Later submissions finish earlier.
                    thread::sleep(Duration::from_millis((2 * (16 - i)) as u64));
                    i * 10
                }
            })
            .collect();

        let results = run_batch(tasks, &config(4, 5_000), &issues);
        assert_eq!(results.len(), 16);
        for (index, slot) in results.iter().enumerate() {
            assert_eq!(*slot, Some(index * 10));
        }
        assert!(issues.is_empty());
    }

    #[test]
    fn test_deadline_omits_stragglers_and_records_issues() {
        let issues = IssueLedger::new();
        let tasks: Vec<Box<dyn FnOnce() -> usize + Send>> = vec![
            Box::new(|| 1),
            Box::new(|| {
                thread::sleep(Duration::from_secs(10));
                2
            }),
        ];

        let results = run_batch(tasks, &config(2, 200), &issues);
        assert_eq!(results[0], Some(1));
        assert_eq!(results[1], None);

        let summary = issues.summary();
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.errors, 0);
    }

    #[test]
    fn test_concurrency_is_bounded() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let live = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let issues = IssueLedger::new();

        let tasks: Vec<_> = (0..12)
            .map(|_| {
                let live = Arc::clone(&live);
                let peak = Arc::clone(&peak);
                move || {
                    let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(20));
                    live.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();

        run_batch(tasks, &config(3, 10_000), &issues);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_empty_batch() {
        let issues = IssueLedger::new();
        let results = run_batch(Vec::<fn() -> u8>::new(), &config(4, 100), &issues);
        assert!(results.is_empty());
        assert!(issues.is_empty());
    }
}
