//! A named string column that owns a dictionary and promotes it on demand.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::DictionaryArray;
use arrow::datatypes::Int32Type;
use arrow::record_batch::RecordBatch;
use tracing::{info, warn};

use crate::{AnyDictionary, Error, KeyWidth, Result, Selection};

/// Schema metadata key holding the table name of
/// [`StringColumn::count_by_category`] batches.
pub const TABLE_NAME_METADATA_KEY: &str = "table_name";

/// The key widths a [`StringColumn`] may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnOptions {
    /// Width of the dictionary a new column starts with.
    pub initial_width: KeyWidth,
    /// Widest width the column will promote to.
    pub max_width: KeyWidth,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            initial_width: KeyWidth::Narrow,
            max_width: KeyWidth::Wide,
        }
    }
}

impl ColumnOptions {
    pub fn validate(&self) -> Result<()> {
        if self.initial_width > self.max_width {
            return Err(Error::InvalidWidthRange {
                initial: self.initial_width,
                max: self.max_width,
            });
        }
        Ok(())
    }
}

/// A column of categorical strings.
///
/// Writes go through the current dictionary; if it runs out of keys the
/// column replaces it with a promoted one and retries the write. Once the
/// column is at [`ColumnOptions::max_width`] running out of keys is an
/// [`Error::CapacityExceeded`].
#[derive(Debug)]
pub struct StringColumn {
    name: String,
    dictionary: AnyDictionary,
    max_width: KeyWidth,
}

impl StringColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dictionary: AnyDictionary::default(),
            max_width: KeyWidth::Wide,
        }
    }

    pub fn with_options(name: impl Into<String>, options: ColumnOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            name: name.into(),
            dictionary: AnyDictionary::new(options.initial_width),
            max_width: options.max_width,
        })
    }

    /// Builds a column from a sequence of values, `None` denoting a missing
    /// row.
    pub fn try_from_values<'a, I>(name: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut column = Self::new(name);
        for value in values {
            column.append(value)?;
        }
        Ok(column)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> KeyWidth {
        self.dictionary.width()
    }

    pub fn dictionary(&self) -> &AnyDictionary {
        &self.dictionary
    }

    pub fn len(&self) -> usize {
        self.dictionary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.is_empty()
    }

    pub fn append(&mut self, value: Option<&str>) -> Result<()> {
        match self.dictionary.append(value) {
            Err(Error::KeyExhaustion { .. }) => {
                self.promote()?;
                self.dictionary.append(value)
            }
            result => result,
        }
    }

    pub fn append_missing(&mut self) {
        self.dictionary.append_missing()
    }

    pub fn set(&mut self, row: usize, value: Option<&str>) -> Result<()> {
        match self.dictionary.set(row, value) {
            Err(Error::KeyExhaustion { .. }) => {
                self.promote()?;
                self.dictionary.set(row, value)
            }
            result => result,
        }
    }

    /// Swaps the dictionary for one of the next wider width.
    fn promote(&mut self) -> Result<()> {
        let width = self.width();
        match width.next_wider() {
            Some(next) if next <= self.max_width => {
                self.dictionary = self.dictionary.promote()?;
                info!(
                    column = %self.name,
                    from = %width,
                    to = %next,
                    rows = self.len(),
                    "promoted column dictionary"
                );
                Ok(())
            }
            _ => {
                warn!(
                    column = %self.name,
                    %width,
                    max_width = %self.max_width,
                    "column has run out of dictionary keys"
                );
                Err(Error::capacity_exceeded(width))
            }
        }
    }

    pub fn get(&self, row: usize) -> &str {
        self.dictionary.value_at(row)
    }

    /// The key at `row`, widened to an `i32`.
    pub fn key_at(&self, row: usize) -> i32 {
        self.dictionary.key_at(row)
    }

    /// The value for a key returned by [`Self::key_at`]. Keys are only
    /// meaningful until the column is next promoted.
    pub fn value_for_key(&self, key: i32) -> Option<&str> {
        self.dictionary.value_for_key(key)
    }

    pub fn is_missing(&self, row: usize) -> bool {
        self.dictionary.is_missing(row)
    }

    pub fn first_index_of(&self, value: &str) -> Option<usize> {
        self.dictionary.first_index_of(value)
    }

    /// See [`crate::DictionaryMap::count_unique`].
    pub fn count_unique(&self) -> usize {
        self.dictionary.count_unique()
    }

    pub fn count_missing(&self) -> usize {
        self.dictionary.count_missing()
    }

    pub fn count_occurrences(&self, value: &str) -> usize {
        self.dictionary.count_occurrences(value)
    }

    pub fn clear(&mut self) {
        self.dictionary.clear()
    }

    /// Sorts this column's cells only; other columns of a table are not
    /// reordered with it.
    pub fn sort_ascending(&mut self) {
        self.dictionary.sort_ascending()
    }

    /// See [`Self::sort_ascending`].
    pub fn sort_descending(&mut self) {
        self.dictionary.sort_descending()
    }

    pub fn is_equal_to(&self, value: &str) -> Selection {
        self.dictionary.is_equal_to(value)
    }

    pub fn is_not_equal_to(&self, value: &str) -> Selection {
        self.dictionary.is_not_equal_to(value)
    }

    pub fn is_in<'a, I>(&self, values: I) -> Selection
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.dictionary.select_is_in(values)
    }

    pub fn is_not_in<'a, I>(&self, values: I) -> Selection
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.dictionary.select_is_not_in(values)
    }

    pub fn is_missing_rows(&self) -> Selection {
        self.dictionary.missing_rows()
    }

    pub fn is_not_missing_rows(&self) -> Selection {
        self.dictionary.non_missing_rows()
    }

    /// Category counts for this column, with the schema metadata
    /// [`TABLE_NAME_METADATA_KEY`] set to `Column: <name>`.
    pub fn count_by_category(&self) -> Result<RecordBatch> {
        let batch = self.dictionary.count_by_category()?;
        let metadata = HashMap::from([(
            TABLE_NAME_METADATA_KEY.to_string(),
            format!("Column: {}", self.name),
        )]);
        let schema = Arc::new(batch.schema().as_ref().clone().with_metadata(metadata));
        Ok(batch.with_schema(schema)?)
    }

    pub fn get_dummies(&self) -> Result<RecordBatch> {
        self.dictionary.get_dummies()
    }

    pub fn as_bytes(&self, row: usize) -> Vec<u8> {
        self.dictionary.as_bytes(row)
    }

    pub fn to_arrow(&self) -> Result<DictionaryArray<Int32Type>> {
        self.dictionary.to_arrow()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.dictionary.iter()
    }
}
