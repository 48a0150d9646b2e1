//! Per-key mutual exclusion.

use std::hash::Hash;
use std::sync::{Condvar, Mutex, PoisonError};

use rustc_hash::FxHashSet;

/// Lets at most one holder work on a given key at a time.
///
/// Holders of different keys never block each other.
pub struct KeyGate<K> {
    active: Mutex<FxHashSet<K>>,
    released: Condvar,
}

impl<K: Eq + Hash + Clone> Default for KeyGate<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> KeyGate<K> {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(FxHashSet::default()),
            released: Condvar::new(),
        }
    }

    /// Blocks until no other guard holds `key`, then takes it.
    pub fn lock(&self, key: K) -> GateGuard<'_, K> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        while active.contains(&key) {
            active = self
                .released
                .wait(active)
                .unwrap_or_else(PoisonError::into_inner);
        }
        active.insert(key.clone());
        GateGuard { gate: self, key }
    }

    /// Takes `key` only if it is free.
    pub fn try_lock(&self, key: K) -> Option<GateGuard<'_, K>> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.insert(key.clone()) {
            Some(GateGuard { gate: self, key })
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_locked(&self, key: &K) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    fn release(&self, key: &K) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.remove(key);
        drop(active);
        self.released.notify_all();
    }
}

/// Holds a key in a [`KeyGate`] until dropped.
#[must_use = "the key is released as soon as the guard is dropped"]
pub struct GateGuard<'a, K: Eq + Hash + Clone> {
    gate: &'a KeyGate<K>,
    key: K,
}

impl<K: Eq + Hash + Clone> GateGuard<'_, K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Eq + Hash + Clone> Drop for GateGuard<'_, K> {
    fn drop(&mut self) {
        self.gate.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_distinct_keys_do_not_block() {
        let gate = KeyGate::new();
        let _a = gate.lock(1u32);
        let _b = gate.lock(2u32);
        assert!(gate.is_locked(&1));
        assert!(gate.is_locked(&2));
    }

    #[test]
    fn test_release_on_drop() {
        let gate = KeyGate::new();
        {
            let guard = gate.lock("a");
            assert_eq!(*guard.key(), "a");
            assert!(gate.try_lock("a").is_none());
        }
        assert!(!gate.is_locked(&"a"));
        assert!(gate.try_lock("a").is_some());
    }

    #[test]
    fn test_same_key_is_exclusive() {
        let gate = KeyGate::new();
        let inside = AtomicUsize::new(0);
        let max_inside = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let _guard = gate.lock(7u32);
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(2));
                    inside.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(!gate.is_locked(&7));
    }

    #[test]
    fn test_waiter_proceeds_after_release() {
        let gate = KeyGate::new();
        let guard = gate.lock(3u32);
        std::thread::scope(|s| {
            let waiter = s.spawn(|| {
                let _g = gate.lock(3u32);
                true
            });
            std::thread::sleep(Duration::from_millis(10));
            assert!(!waiter.is_finished());
            drop(guard);
            assert!(waiter.join().unwrap());
        });
    }
}
