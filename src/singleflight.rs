//! Singleflight Module
//!
//! Collapses concurrent computations for the same key into one.
//!
//! The first caller for a key becomes the leader and runs the computation;
//! callers arriving while it runs subscribe to a `watch` channel and receive
//! a clone of the leader's result. Once the leader finishes the key is
//! forgotten, so a later, non-overlapping call computes again.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

// == Single Flight ==
/// Deduplicates in-flight computations keyed by string.
///
/// `T` is the full outcome shared with waiters; for fallible work use a
/// `Result` with a `Clone` error type.
#[derive(Debug)]
pub struct SingleFlight<T> {
    calls: Mutex<HashMap<String, watch::Receiver<Option<T>>>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Waiter(watch::Receiver<Option<T>>),
}

/// Deregisters the leader's call when the leader finishes or is dropped.
struct CallGuard<'a, T> {
    calls: &'a Mutex<HashMap<String, watch::Receiver<Option<T>>>>,
    key: &'a str,
}

impl<T> Drop for CallGuard<'_, T> {
    fn drop(&mut self) {
        self.calls.lock().remove(self.key);
    }
}

impl<T: Clone> SingleFlight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Work ==
    /// Runs `compute` unless a call for `key` is already in flight, in which
    /// case waits for that call and returns its result.
    ///
    /// If a leader is cancelled before producing a result, its waiters retry
    /// and one of them takes over as leader.
    pub async fn work<F, Fut>(&self, key: &str, compute: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let tx = loop {
            match self.join(key) {
                Role::Leader(tx) => break tx,
                Role::Waiter(mut rx) => {
                    debug!(key, "waiting on in-flight call");
                    let shared = match rx.wait_for(Option::is_some).await {
                        Ok(guard) => guard.clone(),
                        Err(_) => None,
                    };
                    if let Some(value) = shared {
                        return value;
                    }
                    debug!(key, "in-flight call abandoned, retrying");
                }
            }
        };

        // Declared after `tx` so the entry is removed before the sender drops.
        let _guard = CallGuard {
            calls: &self.calls,
            key,
        };
        let value = compute().await;
        tx.send_replace(Some(value.clone()));
        value
    }

    /// Number of keys with a computation currently running.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    fn join(&self, key: &str) -> Role<T> {
        let mut calls = self.calls.lock();
        if let Some(rx) = calls.get(key) {
            return Role::Waiter(rx.clone());
        }
        let (tx, rx) = watch::channel(None);
        calls.insert(key.to_string(), rx);
        Role::Leader(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_work_returns_value() {
        let flight: SingleFlight<Result<String, String>> = SingleFlight::new();
        let v = flight.work("key", || async { Ok("bar".to_string()) }).await;
        assert_eq!(v, Ok("bar".to_string()));
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_work_returns_error() {
        let flight: SingleFlight<Result<String, String>> = SingleFlight::new();
        let v = flight.work("key", || async { Err("boom".to_string()) }).await;
        assert_eq!(v, Err("boom".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_share_one_computation() {
        let flight = Arc::new(SingleFlight::<Result<usize, String>>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let flight = Arc::clone(&flight);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                flight
                    .work("key", || async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        Ok(n)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(1));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_errors_are_shared() {
        let flight = Arc::new(SingleFlight::<Result<usize, String>>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let flight = Arc::clone(&flight);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                flight
                    .work("key", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        Err::<usize, _>("backend down".to_string())
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Err("backend down".to_string()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sequential_calls_recompute() {
        let flight: SingleFlight<usize> = SingleFlight::new();
        let calls = AtomicUsize::new(0);

        let first = flight.work("key", || async { calls.fetch_add(1, Ordering::SeqCst) + 1 }).await;
        let second = flight.work("key", || async { calls.fetch_add(1, Ordering::SeqCst) + 1 }).await;

        assert_eq!((first, second), (1, 2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_keys_do_not_collapse() {
        let flight = Arc::new(SingleFlight::<String>::new());

        let a = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move {
                flight
                    .work("a", || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        "a".to_string()
                    })
                    .await
            })
        };
        let b = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move {
                flight
                    .work("b", || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        "b".to_string()
                    })
                    .await
            })
        };

        assert_eq!(a.await.unwrap(), "a");
        assert_eq!(b.await.unwrap(), "b");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancelled_leader_hands_over() {
        let flight = Arc::new(SingleFlight::<&'static str>::new());

        let leader = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move {
                flight
                    .work("key", || async {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        "never"
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let waiter = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move { flight.work("key", || async { "takeover" }).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        leader.abort();

        let value = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter hung after leader was cancelled")
            .unwrap();
        assert_eq!(value, "takeover");
        assert_eq!(flight.in_flight(), 0);
    }
}
