//! Category counts and dummy (one-hot) columns.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use hashbrown::HashMap;

use crate::{CategoryKey, DictionaryMap, Result};

/// Name of the label column produced by [`DictionaryMap::count_by_category`].
pub const CATEGORY_COLUMN_NAME: &str = "Category";

/// Name of the count column produced by [`DictionaryMap::count_by_category`].
pub const COUNT_COLUMN_NAME: &str = "Count";

/// Label of the row counting missing values.
pub const MISSING_CATEGORY_LABEL: &str = "* missing values";

impl<K: CategoryKey> DictionaryMap<K> {
    /// Counts the rows holding each category.
    ///
    /// The batch has one row per category present in the column, in the order
    /// the categories were first added, followed by a
    /// [`MISSING_CATEGORY_LABEL`] row if any rows are missing. The counts sum
    /// to [`Self::len`].
    pub fn count_by_category(&self) -> Result<RecordBatch> {
        let mut counts: HashMap<K, i64> = HashMap::new();
        for &key in self.keys() {
            *counts.entry(key).or_default() += 1;
        }

        let missing = counts.remove(&K::MISSING);
        let mut counts = counts.into_iter().collect::<Vec<_>>();
        counts.sort_unstable_by_key(|(key, _)| *key);

        let mut categories = Vec::with_capacity(counts.len() + 1);
        let mut totals = Vec::with_capacity(counts.len() + 1);
        for (key, count) in counts {
            if let Some(value) = self.value_for_key(key) {
                categories.push(value);
                totals.push(count);
            }
        }
        if let Some(missing) = missing {
            categories.push(MISSING_CATEGORY_LABEL);
            totals.push(missing);
        }

        let schema = Schema::new(vec![
            Field::new(CATEGORY_COLUMN_NAME, DataType::Utf8, false),
            Field::new(COUNT_COLUMN_NAME, DataType::Int64, false),
        ]);
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(categories)),
            Arc::new(Int64Array::from(totals)),
        ];

        Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
    }

    /// Expands the column into one boolean column per category held by the
    /// dictionary, named by the category's value.
    ///
    /// Categories no longer referenced by any row still get a column, which
    /// is then `false` for every row. Each row is `true` in exactly one
    /// column. This does rows * categories work, so it is only suited to low
    /// cardinality columns.
    pub fn get_dummies(&self) -> Result<RecordBatch> {
        let categories = self.bijection().sorted_entries();

        let mut fields = Vec::with_capacity(categories.len());
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(categories.len());
        for (category, name) in categories {
            fields.push(Field::new(name, DataType::Boolean, false));
            let column = self
                .keys()
                .iter()
                .map(|&key| key == category)
                .collect::<Vec<_>>();
            columns.push(Arc::new(BooleanArray::from(column)));
        }

        let options = RecordBatchOptions::new().with_row_count(Some(self.len()));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            columns,
            &options,
        )?)
    }
}
