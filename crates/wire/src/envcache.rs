// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded cache of environment-fingerprint -> environment, held by the
//! conductor so repeat invocations from the same shell don't need to
//! resend their whole environment.

use std::collections::VecDeque;

use parking_lot::Mutex;

const DEFAULT_CAPACITY: usize = 5;

struct Entry {
    fingerprint: u64,
    env: Vec<(String, String)>,
}

struct Inner {
    entries: VecDeque<Entry>,
    capacity: usize,
}

/// FIFO-evicted, thread-safe. Entries are immutable once inserted.
pub struct EnvCache {
    inner: Mutex<Inner>,
}

impl Default for EnvCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EnvCache {
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(Inner { entries: VecDeque::with_capacity(capacity), capacity }) }
    }

    pub fn get(&self, fingerprint: u64) -> Option<Vec<(String, String)>> {
        let inner = self.inner.lock();
        inner.entries.iter().find(|e| e.fingerprint == fingerprint).map(|e| e.env.clone())
    }

    pub fn insert(&self, fingerprint: u64, env: Vec<(String, String)>) {
        let mut inner = self.inner.lock();
        if inner.entries.iter().any(|e| e.fingerprint == fingerprint) {
            return;
        }
        if inner.entries.len() >= inner.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(Entry { fingerprint, env });
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_after_insert() {
        let cache = EnvCache::new(2);
        cache.insert(1, vec![("A".to_string(), "1".to_string())]);
        assert_eq!(cache.get(1), Some(vec![("A".to_string(), "1".to_string())]));
    }

    #[test]
    fn miss_before_insert() {
        let cache = EnvCache::new(2);
        assert_eq!(cache.get(99), None);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let cache = EnvCache::new(2);
        cache.insert(1, vec![]);
        cache.insert(2, vec![]);
        cache.insert(3, vec![]);
        assert_eq!(cache.get(1), None);
        assert!(cache.get(2).is_some());
        assert!(cache.get(3).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let cache = EnvCache::new(5);
        cache.insert(1, vec![("A".to_string(), "1".to_string())]);
        cache.insert(1, vec![("B".to_string(), "2".to_string())]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(1), Some(vec![("A".to_string(), "1".to_string())]));
    }
}
