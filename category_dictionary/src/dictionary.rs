//! A dictionary encoded sequence of string values for a single key width.

use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{DictionaryArray, Int32Array, StringArray};
use arrow::datatypes::Int32Type;
use arrow::error::ArrowError;
use hashbrown::HashMap;
use rayon::slice::ParallelSliceMut;
use tracing::trace;

use crate::{Bijection, CategoryKey, Error, KeyWidth, MISSING_VALUE_INDICATOR, Result};

/// Stores one key per row along with the [`Bijection`] that maps those keys
/// back to their string values.
///
/// Row indexes passed to the accessors must be less than [`Self::len`]; an out
/// of range index panics.
#[derive(Debug)]
pub struct DictionaryMap<K: CategoryKey> {
    /// One key per row, in row order.
    keys: Vec<K>,
    bijection: Bijection<K>,
}

impl<K: CategoryKey> Default for DictionaryMap<K> {
    fn default() -> Self {
        Self {
            keys: vec![],
            bijection: Bijection::new(),
        }
    }
}

impl<K: CategoryKey> DictionaryMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(rows: usize, categories: usize) -> Self {
        Self {
            keys: Vec::with_capacity(rows),
            bijection: Bijection::with_capacity(categories),
        }
    }

    /// Builds a dictionary from a sequence of values, `None` denoting a
    /// missing row.
    pub fn try_from_values<'a, I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let values = values.into_iter();
        let mut dictionary = Self::with_capacity(values.size_hint().0, 0);
        for value in values {
            dictionary.append(value)?;
        }
        Ok(dictionary)
    }

    /// Re-encodes every row, in order, into a dictionary with a different key
    /// type.
    pub fn replay<J: CategoryKey>(&self) -> Result<DictionaryMap<J>> {
        let mut replayed =
            DictionaryMap::with_capacity(self.len(), self.bijection.len());
        for value in self.iter() {
            replayed.append(Some(value))?;
        }
        Ok(replayed)
    }

    pub fn width(&self) -> KeyWidth {
        K::WIDTH
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Appends a row holding `value`. `None` and the empty string are stored
    /// as missing.
    pub fn append(&mut self, value: Option<&str>) -> Result<()> {
        let key = self.bijection.resolve_or_insert(value)?;
        self.keys.push(key);
        Ok(())
    }

    /// Appends a missing row. The sentinel key is always available, so this
    /// cannot fail.
    pub fn append_missing(&mut self) {
        let key = self.bijection.resolve_missing();
        self.keys.push(key);
    }

    /// Replaces the value at `row`.
    ///
    /// The entry for the value previously at `row` stays in the dictionary
    /// even if no other row refers to it, so [`Self::count_unique`] does not
    /// go down.
    pub fn set(&mut self, row: usize, value: Option<&str>) -> Result<()> {
        assert!(
            row < self.len(),
            "row {row} out of bounds for {} rows",
            self.len()
        );
        let key = self.bijection.resolve_or_insert(value)?;
        self.keys[row] = key;
        Ok(())
    }

    /// The value at `row`; [`MISSING_VALUE_INDICATOR`] for missing rows.
    pub fn value_at(&self, row: usize) -> &str {
        self.value_for_key(self.keys[row])
            .unwrap_or(MISSING_VALUE_INDICATOR)
    }

    pub fn key_at(&self, row: usize) -> K {
        self.keys[row]
    }

    pub fn value_for_key(&self, key: K) -> Option<&str> {
        self.bijection.value(key)
    }

    pub fn key_for_value(&self, value: &str) -> Option<K> {
        self.bijection.key(Some(value))
    }

    pub fn is_missing(&self, row: usize) -> bool {
        self.keys[row] == K::MISSING
    }

    /// The raw key of every row, in row order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn bijection(&self) -> &Bijection<K> {
        &self.bijection
    }

    /// The number of keys ever allocated since the last [`Self::clear`],
    /// including the missing sentinel if used.
    ///
    /// Because [`Self::set`] does not prune entries this can exceed the number
    /// of distinct values actually present in the rows.
    pub fn count_unique(&self) -> usize {
        self.bijection.len()
    }

    pub fn count_missing(&self) -> usize {
        self.keys.iter().filter(|&&key| key == K::MISSING).count()
    }

    /// The number of rows holding `value`.
    pub fn count_occurrences(&self, value: &str) -> usize {
        match self.key_for_value(value) {
            Some(key) => self.keys.iter().filter(|&&k| k == key).count(),
            None => 0,
        }
    }

    /// The first row holding `value`, or `None` if no row does. `""` finds
    /// the first missing row.
    pub fn first_index_of(&self, value: &str) -> Option<usize> {
        let key = self.key_for_value(value)?;
        self.keys.iter().position(|&k| k == key)
    }

    /// Determines if `value` is held by the dictionary. This does not imply
    /// that any row still contains it.
    pub fn contains(&self, value: &str) -> bool {
        self.bijection.contains_value(value)
    }

    /// The distinct values held by the dictionary in ascending key order.
    pub fn categories(&self) -> Vec<&str> {
        self.bijection
            .sorted_entries()
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }

    /// The distinct values currently present in the rows.
    pub fn as_set(&self) -> BTreeSet<&str> {
        self.iter().collect()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(ToString::to_string).collect()
    }

    /// Removes all rows and all dictionary entries.
    pub fn clear(&mut self) {
        trace!(rows = self.len(), width = %K::WIDTH, "clearing dictionary");
        self.keys.clear();
        self.bijection.clear();
    }

    /// Reorders the rows by the lexical order of their values. Rows holding
    /// equal values may end up in any relative order.
    pub fn sort_ascending(&mut self) {
        trace!(rows = self.len(), "sorting dictionary ascending");
        let bijection = &self.bijection;
        let mut sorted = self.keys.clone();
        sorted.par_sort_unstable_by(|a, b| bijection.value(*a).cmp(&bijection.value(*b)));
        self.keys = sorted;
    }

    /// Reorders the rows by the reverse lexical order of their values.
    pub fn sort_descending(&mut self) {
        trace!(rows = self.len(), "sorting dictionary descending");
        let bijection = &self.bijection;
        let mut sorted = self.keys.clone();
        sorted.par_sort_unstable_by(|a, b| bijection.value(*b).cmp(&bijection.value(*a)));
        self.keys = sorted;
    }

    /// The value of every row in row order. Each call starts again from the
    /// first row.
    pub fn iter(&self) -> Values<'_, K> {
        Values {
            keys: self.keys.iter(),
            bijection: &self.bijection,
        }
    }

    /// The key at `row` as big-endian bytes, [`KeyWidth::byte_width`] long.
    pub fn as_bytes(&self, row: usize) -> Vec<u8> {
        self.keys[row].to_bytes()
    }

    /// Converts to an arrow dictionary array. Missing rows become nulls and
    /// the missing indicator is not part of the dictionary values.
    pub fn to_arrow(&self) -> Result<DictionaryArray<Int32Type>> {
        let entries = self
            .bijection
            .sorted_entries()
            .into_iter()
            .filter(|(key, _)| *key != K::MISSING)
            .collect::<Vec<_>>();

        let ordinals = entries
            .iter()
            .enumerate()
            .map(|(ordinal, (key, _))| arrow_key(ordinal).map(|ordinal| (*key, ordinal)))
            .collect::<Result<HashMap<_, _>>>()?;

        let keys = self
            .keys
            .iter()
            .map(|key| ordinals.get(key).copied())
            .collect::<Int32Array>();
        let values = StringArray::from_iter_values(entries.into_iter().map(|(_, value)| value));

        Ok(DictionaryArray::try_new(keys, Arc::new(values))?)
    }
}

/// Arrow dictionary keys are `i32`, so a wide dictionary holding more than
/// `i32::MAX` categories cannot be exported.
fn arrow_key(ordinal: usize) -> Result<i32> {
    i32::try_from(ordinal).map_err(|_| Error::from(ArrowError::DictionaryKeyOverflowError))
}

impl<'a, K: CategoryKey> IntoIterator for &'a DictionaryMap<K> {
    type Item = &'a str;
    type IntoIter = Values<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the string values of a [`DictionaryMap`] in row order.
#[derive(Debug, Clone)]
pub struct Values<'a, K: CategoryKey> {
    keys: std::slice::Iter<'a, K>,
    bijection: &'a Bijection<K>,
}

impl<'a, K: CategoryKey> Iterator for Values<'a, K> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        Some(
            self.bijection
                .value(*key)
                .unwrap_or(MISSING_VALUE_INDICATOR),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K: CategoryKey> ExactSizeIterator for Values<'_, K> {}
