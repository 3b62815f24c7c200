//! Row selections and the predicates that build them.

use croaring::Bitmap;
use hashbrown::HashSet;

use crate::{CategoryKey, DictionaryMap};

/// An ascending, de-duplicated set of row ids.
///
/// Row ids are `u32`, so selections are limited to dictionaries of at most
/// `u32::MAX` rows. Selecting over a longer dictionary panics.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection(Bitmap);

impl Default for Selection {
    fn default() -> Self {
        Self(Bitmap::new())
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection containing every row in `0..rows`.
    pub fn all(rows: usize) -> Self {
        let mut bitmap = Bitmap::new();
        bitmap.add_range(0..row_id(rows));
        Self(bitmap)
    }

    pub fn add(&mut self, row: u32) {
        self.0.add(row);
    }

    pub fn contains(&self, row: u32) -> bool {
        self.0.contains(row)
    }

    pub fn len(&self) -> usize {
        self.0.cardinality() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Row ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.0.to_vec()
    }

    /// Rows present in both selections.
    pub fn and(&self, other: &Self) -> Self {
        Self(self.0.and(&other.0))
    }

    /// Rows present in either selection.
    pub fn or(&self, other: &Self) -> Self {
        Self(self.0.or(&other.0))
    }

    /// Rows in `0..rows` that are not in this selection.
    pub fn complement(&self, rows: usize) -> Self {
        Self(Self::all(rows).0.andnot(&self.0))
    }
}

fn row_id(row: usize) -> u32 {
    u32::try_from(row)
        .unwrap_or_else(|_| panic!("row {row} is beyond the u32 row id range of a selection"))
}

impl FromIterator<u32> for Selection {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<K: CategoryKey> DictionaryMap<K> {
    /// The rows holding `value`. A value the dictionary does not hold matches
    /// no rows.
    pub fn is_equal_to(&self, value: &str) -> Selection {
        match self.key_for_value(value) {
            Some(key) => self.select_keys(|k| k == key),
            None => Selection::new(),
        }
    }

    /// The rows not holding `value`, missing rows included.
    pub fn is_not_equal_to(&self, value: &str) -> Selection {
        self.is_equal_to(value).complement(self.len())
    }

    /// The rows holding any of `values`. Values the dictionary does not hold
    /// are ignored.
    pub fn select_is_in<'a, I>(&self, values: I) -> Selection
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keys = values
            .into_iter()
            .filter_map(|value| self.key_for_value(value))
            .collect::<HashSet<_>>();

        if keys.is_empty() {
            return Selection::new();
        }
        self.select_keys(|k| keys.contains(&k))
    }

    /// The rows holding none of `values`.
    pub fn select_is_not_in<'a, I>(&self, values: I) -> Selection
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.select_is_in(values).complement(self.len())
    }

    /// The rows holding the missing value.
    pub fn missing_rows(&self) -> Selection {
        self.select_keys(|k| k == K::MISSING)
    }

    /// The rows holding a value other than the missing value.
    pub fn non_missing_rows(&self) -> Selection {
        self.select_keys(|k| k != K::MISSING)
    }

    fn select_keys(&self, predicate: impl Fn(K) -> bool) -> Selection {
        let mut selection = Selection::new();
        for (i, &key) in self.keys().iter().enumerate() {
            if predicate(key) {
                selection.add(row_id(i));
            }
        }
        selection
    }
}
