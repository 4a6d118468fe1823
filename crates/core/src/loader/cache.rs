//! Request-scoped memoizing batch cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;

use crate::error::{FetchError, FetchResult};

use super::{BatchFn, CacheKey};

/// Default maximum number of keys handed to one batch function call.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

type Slot<V> = Shared<BoxFuture<'static, FetchResult<V>>>;
type Waiter<K, V> = (K, oneshot::Sender<FetchResult<V>>);
type Id<F> = <<F as BatchFn>::Key as CacheKey>::Id;

struct State<F: BatchFn> {
    entries: HashMap<Id<F>, Slot<F::Value>>,
    queue: Vec<Waiter<F::Key, F::Value>>,
    dispatch_scheduled: bool,
}

struct Inner<F: BatchFn> {
    batch_fn: F,
    max_batch_size: usize,
    state: Mutex<State<F>>,
}

impl<F: BatchFn> Inner<F> {
    fn state(&self) -> MutexGuard<'_, State<F>> {
        // State is only mutated through short critical sections that cannot
        // leave it inconsistent, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Deduplicating, memoizing cache over a [`BatchFn`].
///
/// Scoped to a single request: construct one per request and drop it
/// when the request completes. There is no eviction, no TTL and no
/// capacity bound.
///
/// - The first `load` of a key enqueues it; every key enqueued before the
///   dispatcher runs (typically everything requested in the same scheduling
///   tick) is handed to the batch function together.
/// - Every later `load` of an identity-equal key shares the same outcome,
///   including failures, without calling the batch function again.
///
/// Cloning is cheap and yields a handle to the same scope. Must be used
/// from within a Tokio runtime.
pub struct BatchCache<F: BatchFn> {
    inner: Arc<Inner<F>>,
}

impl<F: BatchFn> Clone for BatchCache<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: BatchFn> BatchCache<F> {
    pub fn new(batch_fn: F) -> Self {
        Self::with_max_batch_size(batch_fn, DEFAULT_MAX_BATCH_SIZE)
    }

    /// Create a cache that splits dispatched keys into batches of at most
    /// `max_batch_size` (minimum 1).
    pub fn with_max_batch_size(batch_fn: F, max_batch_size: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                batch_fn,
                max_batch_size: max_batch_size.max(1),
                state: Mutex::new(State {
                    entries: HashMap::new(),
                    queue: Vec::new(),
                    dispatch_scheduled: false,
                }),
            }),
        }
    }

    /// Load a single key.
    pub async fn load(&self, key: F::Key) -> FetchResult<F::Value> {
        let mut slots = self.slots(std::iter::once(key));
        match slots.pop() {
            Some(slot) => slot.await,
            None => Err(FetchError::Dropped),
        }
    }

    /// Load several keys; outcomes are positional with `keys`.
    pub async fn load_many<I>(&self, keys: I) -> Vec<FetchResult<F::Value>>
    where
        I: IntoIterator<Item = F::Key>,
    {
        join_all(self.slots(keys)).await
    }

    /// Number of distinct keys seen by this scope.
    pub fn len(&self) -> usize {
        self.inner.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve each key to its slot, creating and enqueueing missing ones.
    ///
    /// Lookup and insertion happen under a single lock so that two
    /// concurrent callers can never both create an entry for the same key.
    fn slots<I>(&self, keys: I) -> Vec<Slot<F::Value>>
    where
        I: IntoIterator<Item = F::Key>,
    {
        let mut state = self.inner.state();
        let mut slots = Vec::new();

        for key in keys {
            let id = key.cache_id();
            if let Some(slot) = state.entries.get(&id) {
                slots.push(slot.clone());
                continue;
            }

            let (tx, rx) = oneshot::channel();
            let slot = async move { rx.await.unwrap_or(Err(FetchError::Dropped)) }
                .boxed()
                .shared();
            state.entries.insert(id, slot.clone());
            state.queue.push((key, tx));
            slots.push(slot);
        }

        if !state.queue.is_empty() && !state.dispatch_scheduled {
            state.dispatch_scheduled = true;
            tokio::spawn(dispatch(Arc::clone(&self.inner)));
        }

        slots
    }
}

/// Drain the queue and run the batch function over it.
async fn dispatch<F: BatchFn>(inner: Arc<Inner<F>>) {
    // Let loads issued in the same tick join this batch.
    tokio::task::yield_now().await;

    let queue = {
        let mut state = inner.state();
        state.dispatch_scheduled = false;
        std::mem::take(&mut state.queue)
    };

    let mut batches = Vec::new();
    let mut queue = queue.into_iter().peekable();
    while queue.peek().is_some() {
        let batch: Vec<_> = queue.by_ref().take(inner.max_batch_size).collect();
        batches.push(run_batch(&inner.batch_fn, batch));
    }

    join_all(batches).await;
}

async fn run_batch<F: BatchFn>(batch_fn: &F, batch: Vec<Waiter<F::Key, F::Value>>) {
    let (keys, senders): (Vec<_>, Vec<_>) = batch.into_iter().unzip();
    let outcomes = batch_fn.load(&keys).await;

    if outcomes.len() != keys.len() {
        let err = FetchError::BatchMismatch {
            expected: keys.len(),
            actual: outcomes.len(),
        };
        for tx in senders {
            let _ = tx.send(Err(err.clone()));
        }
        return;
    }

    for (tx, outcome) in senders.into_iter().zip(outcomes) {
        // The receiver lives in the cached slot; it is only gone once the
        // whole scope was dropped.
        let _ = tx.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::loader::StructuredKey;

    /// Echoes keys back, recording every batch it receives.
    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
        batches: Mutex<Vec<Vec<u64>>>,
    }

    #[async_trait]
    impl BatchFn for Arc<Echo> {
        type Key = u64;
        type Value = String;

        async fn load(&self, keys: &[u64]) -> Vec<FetchResult<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.batches.lock().unwrap().push(keys.to_vec());
            keys.iter().map(|k| Ok(format!("value-{k}"))).collect()
        }
    }

    /// Resolves keys out of order: larger keys finish first.
    struct Staggered;

    #[async_trait]
    impl BatchFn for Staggered {
        type Key = u64;
        type Value = u64;

        async fn load(&self, keys: &[u64]) -> Vec<FetchResult<u64>> {
            let tasks = keys.iter().map(|&k| async move {
                tokio::time::sleep(Duration::from_millis(30 - k * 10)).await;
                Ok(k * 100)
            });
            join_all(tasks).await
        }
    }

    /// Fails every odd key.
    #[derive(Default)]
    struct FailOdd {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BatchFn for Arc<FailOdd> {
        type Key = u64;
        type Value = u64;

        async fn load(&self, keys: &[u64]) -> Vec<FetchResult<u64>> {
            self.calls.fetch_add(keys.len(), Ordering::SeqCst);
            keys.iter()
                .map(|&k| {
                    if k % 2 == 1 {
                        Err(FetchError::Transport(format!("boom {k}")))
                    } else {
                        Ok(k)
                    }
                })
                .collect()
        }
    }

    /// Breaks the one-outcome-per-key contract.
    struct Short;

    #[async_trait]
    impl BatchFn for Short {
        type Key = u64;
        type Value = u64;

        async fn load(&self, _keys: &[u64]) -> Vec<FetchResult<u64>> {
            vec![Ok(1)]
        }
    }

    #[derive(Default)]
    struct CountStructured {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BatchFn for Arc<CountStructured> {
        type Key = StructuredKey;
        type Value = String;

        async fn load(&self, keys: &[StructuredKey]) -> Vec<FetchResult<String>> {
            self.calls.fetch_add(keys.len(), Ordering::SeqCst);
            keys.iter().map(|k| Ok(k.canonical())).collect()
        }
    }

    // Test critique: deux load successifs => un seul appel au fetch
    #[tokio::test]
    async fn test_sequential_loads_fetch_once() {
        let echo = Arc::new(Echo::default());
        let cache = BatchCache::new(echo.clone());

        let first = cache.load(7).await.unwrap();
        let second = cache.load(7).await.unwrap();

        assert_eq!(first, "value-7");
        assert_eq!(first, second);
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    // Les requêtes concurrentes sur la même clé sont fusionnées
    #[tokio::test]
    async fn test_concurrent_loads_are_coalesced_into_one_batch() {
        let echo = Arc::new(Echo::default());
        let cache = BatchCache::new(echo.clone());

        let (a, b, c, d) = tokio::join!(cache.load(1), cache.load(2), cache.load(1), cache.load(3));

        assert_eq!(a.unwrap(), "value-1");
        assert_eq!(b.unwrap(), "value-2");
        assert_eq!(c.unwrap(), "value-1");
        assert_eq!(d.unwrap(), "value-3");
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);

        let batches = echo.batches.lock().unwrap();
        assert_eq!(batches.as_slice(), &[vec![1, 2, 3]]);
    }

    // Test critique: check-then-create reste atomique entre threads réels
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_tasks_fetch_each_key_once() {
        let echo = Arc::new(Echo::default());
        let cache = BatchCache::new(echo.clone());

        let tasks: Vec<_> = (0..200u64)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move { (i % 10, cache.load(i % 10).await) })
            })
            .collect();

        for task in join_all(tasks).await {
            let (key, value) = task.unwrap();
            assert_eq!(value.unwrap(), format!("value-{key}"));
        }

        let mut fetched: Vec<u64> = echo.batches.lock().unwrap().concat();
        fetched.sort();
        assert_eq!(fetched, (0..10).collect::<Vec<_>>());
        assert_eq!(cache.len(), 10);
    }

    #[tokio::test]
    async fn test_load_many_deduplicates_within_call() {
        let echo = Arc::new(Echo::default());
        let cache = BatchCache::new(echo.clone());

        let results = cache.load_many([4, 4, 5]).await;
        let values: Vec<String> = results.into_iter().map(Result::unwrap).collect();

        assert_eq!(values, ["value-4", "value-4", "value-5"]);
        assert_eq!(echo.batches.lock().unwrap().as_slice(), &[vec![4, 5]]);
    }

    // Test critique: l'ordre des résultats suit l'ordre des clés
    #[tokio::test]
    async fn test_load_many_preserves_input_order() {
        let cache = BatchCache::new(Staggered);

        let results = cache.load_many([0, 1, 2]).await;
        let values: Vec<u64> = results.into_iter().map(Result::unwrap).collect();

        assert_eq!(values, [0, 100, 200]);
    }

    #[tokio::test]
    async fn test_load_many_mixes_cached_and_fresh_keys() {
        let echo = Arc::new(Echo::default());
        let cache = BatchCache::new(echo.clone());

        cache.load(2).await.unwrap();
        let results = cache.load_many([1, 2, 3]).await;
        let values: Vec<String> = results.into_iter().map(Result::unwrap).collect();

        assert_eq!(values, ["value-1", "value-2", "value-3"]);
        assert_eq!(
            echo.batches.lock().unwrap().as_slice(),
            &[vec![2], vec![1, 3]]
        );
    }

    // Test critique: un échec est mis en cache et rejoué, jamais réessayé
    #[tokio::test]
    async fn test_failures_are_cached_per_key() {
        let fail = Arc::new(FailOdd::default());
        let cache = BatchCache::new(fail.clone());

        let first = cache.load(1).await;
        let second = cache.load(1).await;
        assert_eq!(first, Err(FetchError::Transport("boom 1".into())));
        assert_eq!(first, second);

        // Les autres clés du même lot ne sont pas contaminées
        assert_eq!(cache.load(2).await, Ok(2));
        assert_eq!(fail.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_new_scope_retries_failed_key() {
        let fail = Arc::new(FailOdd::default());

        let scope_a = BatchCache::new(fail.clone());
        assert!(scope_a.load(3).await.is_err());

        let scope_b = BatchCache::new(fail.clone());
        assert!(scope_b.load(3).await.is_err());

        assert_eq!(fail.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_structured_keys_share_entry_regardless_of_field_order() {
        let counter = Arc::new(CountStructured::default());
        let cache = BatchCache::new(counter.clone());

        let a = cache
            .load(StructuredKey::new().field("name", "husky").field("limit", 10))
            .await
            .unwrap();
        let b = cache
            .load(StructuredKey::new().field("limit", 10).field("name", "husky"))
            .await
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_max_batch_size_splits_dispatch() {
        let echo = Arc::new(Echo::default());
        let cache = BatchCache::with_max_batch_size(echo.clone(), 2);

        let results = cache.load_many([1, 2, 3, 4, 5]).await;
        assert!(results.iter().all(Result::is_ok));

        let mut batches = echo.batches.lock().unwrap().clone();
        batches.sort();
        assert_eq!(batches, [vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[tokio::test]
    async fn test_batch_contract_violation_fails_every_key() {
        let cache = BatchCache::new(Short);

        let results = cache.load_many([1, 2]).await;
        for result in results {
            assert_eq!(
                result,
                Err(FetchError::BatchMismatch {
                    expected: 2,
                    actual: 1
                })
            );
        }
    }

    #[tokio::test]
    async fn test_clones_share_the_same_scope() {
        let echo = Arc::new(Echo::default());
        let cache = BatchCache::new(echo.clone());
        let handle = cache.clone();

        cache.load(9).await.unwrap();
        handle.load(9).await.unwrap();

        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
        assert!(!handle.is_empty());
    }
}
