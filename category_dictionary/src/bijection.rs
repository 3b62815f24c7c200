//! The key/value bijection at the heart of every dictionary.

use std::sync::Arc;

use bimap::{BiHashMap, Overwritten};

use crate::{CategoryKey, Error, MISSING_VALUE_INDICATOR, Result};

/// A one-to-one mapping between keys and category values together with the
/// counter that issues new keys.
///
/// The forward (key to value) and backward (value to key) directions are held
/// in a single [`BiHashMap`], and the only ways to change them are
/// [`Bijection::resolve_or_insert`] and [`Bijection::clear`], so the two
/// directions are always exact inverses.
#[derive(Debug)]
pub struct Bijection<K: CategoryKey> {
    map: BiHashMap<K, Arc<str>>,
    /// The last key issued, or `K::COUNTER_START` if none has been.
    counter: K,
}

impl<K: CategoryKey> Default for Bijection<K> {
    fn default() -> Self {
        Self {
            map: BiHashMap::new(),
            counter: K::COUNTER_START,
        }
    }
}

impl<K: CategoryKey> Bijection<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: BiHashMap::with_capacity(capacity),
            counter: K::COUNTER_START,
        }
    }

    /// Returns the key for `value`, allocating one if the value has not been
    /// seen before.
    ///
    /// `None` and [`MISSING_VALUE_INDICATOR`] resolve to `K::MISSING`, which
    /// never consumes the counter. Fails with [`Error::KeyExhaustion`] if a new
    /// key is needed and the counter has reached the sentinel.
    pub(crate) fn resolve_or_insert(&mut self, value: Option<&str>) -> Result<K> {
        let value = match value {
            Some(value) if value != MISSING_VALUE_INDICATOR => value,
            _ => return Ok(self.resolve_missing()),
        };

        if let Some(&key) = self.map.get_by_right(value) {
            return Ok(key);
        }

        let key = K::next(self.counter).ok_or_else(|| Error::key_exhaustion(K::WIDTH))?;
        self.counter = key;
        self.insert(key, Arc::from(value));
        Ok(key)
    }

    /// Returns the sentinel key, adding its entry on first use.
    pub(crate) fn resolve_missing(&mut self) -> K {
        if !self.map.contains_left(&K::MISSING) {
            self.insert(K::MISSING, Arc::from(MISSING_VALUE_INDICATOR));
        }
        K::MISSING
    }

    fn insert(&mut self, key: K, value: Arc<str>) {
        let overwritten = self.map.insert(key, value);
        debug_assert!(
            matches!(overwritten, Overwritten::Neither),
            "bijection entry overwritten: {overwritten:?}"
        );
    }

    /// Removes every entry and resets the counter.
    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.counter = K::COUNTER_START;
    }

    /// Returns the key held for `value` without allocating.
    pub fn key(&self, value: Option<&str>) -> Option<K> {
        match value {
            Some(value) if value != MISSING_VALUE_INDICATOR => {
                self.map.get_by_right(value).copied()
            }
            _ => self
                .map
                .contains_left(&K::MISSING)
                .then_some(K::MISSING),
        }
    }

    /// Returns the value held for `key`.
    pub fn value(&self, key: K) -> Option<&str> {
        self.map.get_by_left(&key).map(AsRef::as_ref)
    }

    /// Determines if `value` is held, whether or not any row still uses it.
    pub fn contains_value(&self, value: &str) -> bool {
        self.map.contains_right(value)
    }

    /// The number of keys held, including the sentinel if it has been used.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All entries in ascending key order.
    pub fn sorted_entries(&self) -> Vec<(K, &str)> {
        let mut entries = self
            .map
            .iter()
            .map(|(key, value)| (*key, value.as_ref()))
            .collect::<Vec<_>>();
        entries.sort_unstable_by_key(|(key, _)| *key);
        entries
    }

    #[cfg(test)]
    pub(crate) fn set_counter(&mut self, counter: K) {
        self.counter = counter;
    }
}
