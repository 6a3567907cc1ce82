//! Stale-while-revalidate cache with request coalescing.
//!
//! Keys are fully-formed upstream URLs. Fresh entries are served directly,
//! expired entries are served stale while a single background refresh runs,
//! and concurrent first misses share one upstream fetch.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};

use crate::error::{PsychonautError, Result};

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

struct State<V> {
    entries: HashMap<String, Entry<V>>,
    /// Keys with a background refresh in flight.
    refreshing: HashSet<String>,
    /// First-miss leaders, keyed so followers can wait for the outcome.
    pending: HashMap<String, Arc<Notify>>,
}

#[derive(Clone)]
pub struct SwrCache<V> {
    ttl: Duration,
    state: Arc<Mutex<State<V>>>,
}

impl<V> SwrCache<V>
where
    V: Clone + Send + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Arc::new(Mutex::new(State {
                entries: HashMap::new(),
                refreshing: HashSet::new(),
                pending: HashMap::new(),
            })),
        }
    }

    /// Looks up `key`, falling back to `producer` as the source of truth.
    ///
    /// Expired entries are never evicted here; they keep serving reads until
    /// a refresh replaces them. Only a first-ever miss awaits the producer.
    pub async fn get<F, Fut>(&self, key: String, producer: F) -> Result<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        {
            let mut state = self.state.lock().await;
            if let Some(entry) = state.entries.get(&key) {
                let age = entry.stored_at.elapsed();
                if age <= self.ttl {
                    debug!(key = %key, age_ms = age.as_millis() as u64, "cache hit");
                    return Ok(entry.value.clone());
                }
                let stale = entry.value.clone();
                if state.refreshing.insert(key.clone()) {
                    debug!(key = %key, age_ms = age.as_millis() as u64, "cache stale, refreshing in background");
                    self.spawn_refresh(key, producer);
                } else {
                    debug!(key = %key, "cache stale, refresh already in flight");
                }
                return Ok(stale);
            }

            if state.pending.contains_key(&key) {
                drop(state);
                return self.await_leader(&key).await;
            }
            state.pending.insert(key.clone(), Arc::new(Notify::new()));
        }

        debug!(key = %key, "cache miss, fetching");
        let outcome = producer().await;

        let mut state = self.state.lock().await;
        let notify = state.pending.remove(&key);
        let result = match outcome {
            Ok(value) => {
                state.entries.insert(
                    key,
                    Entry {
                        value: value.clone(),
                        stored_at: Instant::now(),
                    },
                );
                Ok(value)
            }
            Err(error) => Err(error),
        };
        drop(state);
        if let Some(notify) = notify {
            notify.notify_waiters();
        }
        result
    }

    fn spawn_refresh<F, Fut>(&self, key: String, producer: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let outcome = producer().await;
            let mut state = state.lock().await;
            match outcome {
                Ok(value) => {
                    state.entries.insert(
                        key.clone(),
                        Entry {
                            value,
                            stored_at: Instant::now(),
                        },
                    );
                    debug!(key = %key, "background refresh complete");
                }
                Err(error) => {
                    warn!(key = %key, error = %error, "background refresh failed, keeping stale entry");
                }
            }
            state.refreshing.remove(&key);
        });
    }

    /// Waits for the first-miss leader to settle, then reads its result.
    async fn await_leader(&self, key: &str) -> Result<V> {
        loop {
            let notify = {
                let state = self.state.lock().await;
                if let Some(entry) = state.entries.get(key) {
                    return Ok(entry.value.clone());
                }
                match state.pending.get(key) {
                    Some(notify) => Arc::clone(notify),
                    None => {
                        return Err(PsychonautError::Upstream(
                            "coalesced upstream fetch failed".into(),
                        ))
                    }
                }
            };

            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            // The leader may have settled between the lookup and enable();
            // re-check before parking so the wakeup cannot be missed.
            {
                let state = self.state.lock().await;
                let current = state.pending.get(key);
                let settled = match current {
                    Some(n) => !Arc::ptr_eq(n, &notify),
                    None => true,
                };
                if settled {
                    continue;
                }
            }

            notified.await;
        }
    }
}
