//! Keyed registry of recurring fetches.
//!
//! Each tracked key runs one loop: sleep the interval, fetch, hand the result
//! downstream, repeat until a completion predicate holds or the fetch fails.
//! Cancellation is synchronous: once a key is stopped or replaced, a fetch
//! already in flight can no longer reach the downstream callback.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

/// Scheduler for per-key recurring polls.
///
/// Cheap to clone; clones share the same registry. Ticks for one key are
/// strictly sequential (the next sleep starts only after the previous fetch
/// settles); ticks for different keys are independent. Dropping the last
/// clone aborts every remaining poll.
pub struct PollScheduler<K> {
    inner: Arc<Inner<K>>,
}

struct Inner<K> {
    polls: Mutex<HashMap<K, ActivePoll>>,
    next_generation: AtomicU64,
}

/// One live poll. The generation stamp is what makes cancellation airtight:
/// a tick only applies its result while its generation is still the one
/// registered for the key.
struct ActivePoll {
    generation: u64,
    task: JoinHandle<()>,
}

impl<K> Clone for PollScheduler<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K> Default for PollScheduler<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> PollScheduler<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                polls: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Begin polling `key` every `interval`.
    ///
    /// Starting an already-active key cancels the previous poll and replaces
    /// it, so duplicate timers for one key cannot accumulate.
    ///
    /// Each tick awaits `fetch`. On success the value goes to `on_success`
    /// and the poll retires once `is_done` holds. On failure the poll retires
    /// immediately (no retry), the error is logged, and `on_failure` runs.
    /// If the key was cancelled while the fetch was in flight, neither
    /// callback runs.
    pub fn start<T, E, FetchFn, Fut, OnSuccess, IsDone, OnFailure>(
        &self,
        key: K,
        interval: Duration,
        mut fetch: FetchFn,
        mut on_success: OnSuccess,
        is_done: IsDone,
        on_failure: OnFailure,
    ) where
        T: Send + 'static,
        E: Display + Send + 'static,
        FetchFn: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        OnSuccess: FnMut(T) + Send + 'static,
        IsDone: Fn(&T) -> bool + Send + 'static,
        OnFailure: FnOnce(E) + Send + 'static,
    {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let scheduler = self.clone();
        let loop_key = key.clone();

        // Register before the first tick can possibly run: the task is
        // spawned while the registry lock is held, and its first generation
        // check has to take that same lock.
        let mut polls = self.lock_polls();
        if let Some(previous) = polls.remove(&key) {
            previous.task.abort();
        }
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if !scheduler.is_current(&loop_key, generation) {
                    return;
                }
                match fetch().await {
                    Ok(value) => {
                        // Fire-and-check: the fetch may have outlived a
                        // cancellation. A stale result must not be applied.
                        if !scheduler.is_current(&loop_key, generation) {
                            return;
                        }
                        // Retire before delivering the final value, so
                        // anyone woken by it already sees the key inactive.
                        let done = is_done(&value);
                        if done {
                            scheduler.retire(&loop_key, generation);
                        }
                        on_success(value);
                        if done {
                            return;
                        }
                    }
                    Err(err) => {
                        if scheduler.retire(&loop_key, generation) {
                            warn!(key = ?loop_key, error = %err, "poll fetch failed, stopping key");
                            on_failure(err);
                        }
                        return;
                    }
                }
            }
        });
        polls.insert(key, ActivePoll { generation, task });
    }

    /// Stop polling `key`. Safe to call for keys that were never started.
    pub fn stop(&self, key: &K) {
        if let Some(poll) = self.lock_polls().remove(key) {
            poll.task.abort();
        }
    }

    /// Stop every active poll. Idempotent.
    pub fn stop_all(&self) {
        for (_, poll) in self.lock_polls().drain() {
            poll.task.abort();
        }
    }

    #[must_use]
    pub fn is_active(&self, key: &K) -> bool {
        self.lock_polls().contains_key(key)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.lock_polls().len()
    }

    fn is_current(&self, key: &K, generation: u64) -> bool {
        self.lock_polls().get(key).map(|poll| poll.generation) == Some(generation)
    }

    /// Remove the key's entry if `generation` is still the registered one.
    /// Returns whether this call retired it.
    fn retire(&self, key: &K, generation: u64) -> bool {
        let mut polls = self.lock_polls();
        match polls.get(key) {
            Some(poll) if poll.generation == generation => {
                polls.remove(key);
                true
            }
            _ => false,
        }
    }

    fn lock_polls(&self) -> MutexGuard<'_, HashMap<K, ActivePoll>> {
        self.inner
            .polls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K> Drop for Inner<K> {
    fn drop(&mut self) {
        // Last clone gone: nothing can observe results anymore, kill the loops.
        if let Ok(mut polls) = self.polls.lock() {
            for (_, poll) in polls.drain() {
                poll.task.abort();
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
