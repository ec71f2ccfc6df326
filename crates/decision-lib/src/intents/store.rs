//! Concurrent keyed storage for resolved scheduling intents

use crate::models::SchedulingIntent;
use dashmap::DashMap;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::sync::Arc;

/// Concurrent map whose values are replaced wholesale.
///
/// Values are held behind `Arc`, so a reader always sees a complete value
/// even while a writer swaps in a new one for the same key.
pub struct KeyedStore<K, V>
where
    K: Eq + Hash,
{
    inner: Arc<DashMap<K, Arc<V>>>,
}

impl<K, V> Clone for KeyedStore<K, V>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for KeyedStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the value at `key`
    pub fn store(&self, key: K, value: V) {
        self.inner.insert(key, Arc::new(value));
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.inner.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Visit a snapshot of every entry until `visit` breaks.
    ///
    /// The snapshot is taken before visiting, so `visit` may call back into
    /// the store.
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> ControlFlow<()>,
    {
        for (key, value) in self.snapshot() {
            if visit(&key, &value).is_break() {
                break;
            }
        }
    }

    fn snapshot(&self) -> Vec<(K, Arc<V>)> {
        self.inner
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Resolved intents keyed by `"<pod id>-<pid>"`
pub type IntentStore = KeyedStore<String, Vec<SchedulingIntent>>;

/// Store key for one process of one pod
pub fn intent_key(pod_id: &str, pid: u32) -> String {
    format!("{}-{}", pod_id, pid)
}

impl KeyedStore<String, Vec<SchedulingIntent>> {
    /// Flatten every stored list into one vector (order not guaranteed)
    pub fn list_all(&self) -> Vec<SchedulingIntent> {
        let mut intents = Vec::new();
        self.range(|_, value| {
            intents.extend(value.iter().cloned());
            ControlFlow::Continue(())
        });
        intents
    }
}
