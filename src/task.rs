//! Fixed-size parallel task runner.
//!
//! [`TaskPool`] runs a batch of closures across a fixed number of OS threads
//! and blocks the submitter until the whole batch has finished. Each task
//! receives a [`Shard`] describing its position in the batch, which is how
//! per-vertex work is partitioned: task `i` of `n` owns a deterministic slice
//! of the index range regardless of which thread picks it up.
//!
//! For the common produce-into-an-output-buffer pattern,
//! [`TaskPool::run_on_slice`] splits a caller-owned slice into per-task
//! disjoint chunks, so each task writes through an exclusive `&mut` without
//! any locking.
//!
//! The pool is scoped: threads are spawned per batch with
//! [`std::thread::scope`], so tasks may borrow from the caller's stack. There
//! is no cancellation or timeout; a batch runs to completion.

use std::sync::atomic::{AtomicUsize, Ordering};

/// A task's position within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shard {
    /// This task's index in the batch, `0..count`.
    pub index: usize,
    /// Total number of tasks in the batch.
    pub count: usize,
}

impl Shard {
    /// The half-open subrange of `0..len` this shard owns when `len` items
    /// are split into contiguous near-equal chunks.
    pub fn chunk_range(&self, len: usize) -> std::ops::Range<usize> {
        let base = len / self.count;
        let extra = len % self.count;
        // The first `extra` shards take one extra item each.
        let start = self.index * base + self.index.min(extra);
        let size = base + usize::from(self.index < extra);
        start..(start + size).min(len)
    }
}

/// A fixed-size pool of worker threads with a blocking join barrier.
#[derive(Debug, Clone)]
pub struct TaskPool {
    threads: usize,
}

impl TaskPool {
    /// Create a pool that runs batches on `threads` OS threads.
    ///
    /// `threads` is clamped to at least 1.
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    /// Create a pool sized to the available hardware parallelism.
    pub fn with_hardware_threads() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(threads)
    }

    /// Number of threads batches run on.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Invoke `f` once per task, each call given its [`Shard`], and block
    /// until all of them have returned.
    ///
    /// Tasks are claimed from a shared counter, so a pool with fewer threads
    /// than tasks still executes every task exactly once.
    pub fn run<F>(&self, tasks: usize, f: F)
    where
        F: Fn(Shard) + Send + Sync,
    {
        if tasks == 0 {
            return;
        }

        let next = AtomicUsize::new(0);
        let f = &f;
        let next = &next;

        std::thread::scope(|scope| {
            for _ in 0..self.threads.min(tasks) {
                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    if index >= tasks {
                        break;
                    }
                    f(Shard {
                        index,
                        count: tasks,
                    });
                });
            }
        });
        // scope join is the barrier; nothing outlives this call
    }

    /// Partition `out` into one contiguous chunk per task and run `f` on each.
    ///
    /// `f` receives the task's [`Shard`], the chunk's base offset into `out`,
    /// and exclusive mutable access to the chunk. One task is spawned per
    /// pool thread; together the chunks cover `out` exactly once, so the
    /// result is identical for any thread count.
    pub fn run_on_slice<T, F>(&self, out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(Shard, usize, &mut [T]) + Send + Sync,
    {
        if out.is_empty() {
            return;
        }

        let tasks = self.threads.min(out.len());
        let total = out.len();
        let f = &f;

        std::thread::scope(|scope| {
            let mut rest = out;
            let mut offset = 0usize;
            for index in 0..tasks {
                let shard = Shard {
                    index,
                    count: tasks,
                };
                let len = shard.chunk_range(total).len();
                let (chunk, tail) = rest.split_at_mut(len);
                rest = tail;
                let base = offset;
                offset += len;
                scope.spawn(move || f(shard, base, chunk));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_every_task_runs_once() {
        let pool = TaskPool::new(4);
        let counter = AtomicUsize::new(0);
        pool.run(16, |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn test_shard_fields() {
        let pool = TaskPool::new(2);
        let seen = std::sync::Mutex::new(Vec::new());
        pool.run(5, |shard| {
            assert_eq!(shard.count, 5);
            seen.lock().unwrap().push(shard.index);
        });
        let mut indices = seen.into_inner().unwrap();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_more_tasks_than_threads() {
        let pool = TaskPool::new(1);
        let counter = AtomicUsize::new(0);
        pool.run(8, |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_zero_tasks_is_noop() {
        let pool = TaskPool::new(4);
        pool.run(0, |_| panic!("no task should run"));
    }

    #[test]
    fn test_chunk_ranges_cover_exactly() {
        for count in 1..6 {
            for len in [0usize, 1, 5, 7, 16] {
                let mut covered = vec![0u32; len];
                for index in 0..count {
                    let shard = Shard { index, count };
                    for i in shard.chunk_range(len) {
                        covered[i] += 1;
                    }
                }
                assert!(covered.iter().all(|&c| c == 1) || len == 0);
            }
        }
    }

    #[test]
    fn test_run_on_slice_writes_every_element() {
        let pool = TaskPool::new(4);
        let mut out = vec![0usize; 23];
        pool.run_on_slice(&mut out, |_, base, chunk| {
            for (i, slot) in chunk.iter_mut().enumerate() {
                *slot = base + i;
            }
        });
        let expected: Vec<usize> = (0..23).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_run_on_slice_thread_count_invariant() {
        let compute = |threads: usize| {
            let pool = TaskPool::new(threads);
            let mut out = vec![0u64; 100];
            pool.run_on_slice(&mut out, |_, base, chunk| {
                for (i, slot) in chunk.iter_mut().enumerate() {
                    let idx = (base + i) as u64;
                    *slot = idx * idx + 1;
                }
            });
            out
        };
        let single = compute(1);
        for threads in [2, 4, 8] {
            assert_eq!(compute(threads), single);
        }
    }
}
