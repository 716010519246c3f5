use std::{collections::HashMap, hash::Hash, sync::Mutex};

/// A mutex-guarded map that computes each value at most once.
///
/// Lookups clone the stored value out, so `V` is typically cheap to clone
/// (an `Arc`, a short `String`).
#[derive(Debug)]
pub struct MemoMap<K, V> {
    inner: Mutex<HashMap<K, V>>,
}

impl<K, V> MemoMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, computing and storing it if absent.
    ///
    /// The lock is held while `compute` runs, so concurrent callers asking for
    /// the same key observe a single computation.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        let mut map = self.lock();
        map.entry(key).or_insert_with(compute).clone()
    }

    /// Return the cached value for `key` if one was computed.
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, V>> {
        // A panic inside `compute` leaves the map itself consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K, V> Default for MemoMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
    };

    use super::*;

    #[test]
    fn test_computes_once() {
        let memo = MemoMap::new();
        let calls = AtomicUsize::new(0);

        let first = memo.get_or_insert_with("Date", || {
            calls.fetch_add(1, Ordering::SeqCst);
            "chrono::NaiveDate".to_string()
        });
        let second = memo.get_or_insert_with("Date", || {
            calls.fetch_add(1, Ordering::SeqCst);
            "unused".to_string()
        });

        assert_eq!(first, "chrono::NaiveDate");
        assert_eq!(second, "chrono::NaiveDate");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let memo: MemoMap<&str, u32> = MemoMap::default();
        assert!(memo.is_empty());
        assert_eq!(memo.get(&"missing"), None);
    }

    #[test]
    fn test_concurrent_callers_share_value() {
        let memo = Arc::new(MemoMap::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    memo.get_or_insert_with(1u32, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        42u64
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
