use std::collections::BTreeSet;

use arrow::array::AsArray;
use arrow::datatypes::Int64Type;
use category_dictionary::{CategoryKey, DictionaryMap, KeyWidth, MISSING_VALUE_INDICATOR};
use proptest::prelude::*;

/// Rows drawn from a small alphabet so values repeat, with `None` for missing.
fn rows() -> impl Strategy<Value = Vec<Option<String>>> {
    prop::collection::vec(
        prop_oneof![
            4 => "[a-e]{1,2}".prop_map(Some),
            1 => Just(None),
        ],
        0..200,
    )
}

fn build<K: CategoryKey>(rows: &[Option<String>]) -> DictionaryMap<K> {
    DictionaryMap::try_from_values(rows.iter().map(Option::as_deref)).unwrap()
}

fn check_bijection<K: CategoryKey>(dictionary: &DictionaryMap<K>) {
    let bijection = dictionary.bijection();
    for (key, value) in bijection.sorted_entries() {
        assert_eq!(bijection.key(Some(value)), Some(key));
        assert_eq!(bijection.value(key), Some(value));
    }
    for &key in dictionary.keys() {
        assert!(bijection.value(key).is_some(), "row key {key} not in dictionary");
    }
}

proptest! {
    #[test]
    fn bijection_holds(rows in rows(), overwrites in prop::collection::vec((0usize..200, "[a-g]{1,2}"), 0..20)) {
        let mut dictionary = build::<i16>(&rows);
        for (row, value) in overwrites {
            if row < dictionary.len() {
                dictionary.set(row, Some(&value)).unwrap();
            }
        }
        check_bijection(&dictionary);
    }

    #[test]
    fn append_allocates_once_per_value(rows in rows()) {
        let mut dictionary = DictionaryMap::<i8>::new();
        let mut seen = BTreeSet::new();
        for value in &rows {
            let before = dictionary.count_unique();
            dictionary.append(value.as_deref()).unwrap();
            let expected = if seen.insert(value.clone().unwrap_or_default()) { 1 } else { 0 };
            prop_assert_eq!(dictionary.count_unique(), before + expected);
        }
    }

    #[test]
    fn missing_rows_round_trip(rows in rows()) {
        let dictionary = build::<i8>(&rows);
        let expected = rows.iter().filter(|v| v.is_none()).count();
        prop_assert_eq!(dictionary.count_missing(), expected);
        for (row, value) in rows.iter().enumerate() {
            prop_assert_eq!(dictionary.is_missing(row), value.is_none());
            if value.is_none() {
                prop_assert_eq!(dictionary.value_at(row), MISSING_VALUE_INDICATOR);
            }
        }
    }

    #[test]
    fn selection_matches_scan(rows in rows(), query in prop::collection::vec("[a-g]{1,2}", 0..6)) {
        let dictionary = build::<i32>(&rows);
        let expected = (0..dictionary.len())
            .filter(|&row| query.iter().any(|q| q == dictionary.value_at(row)))
            .map(|row| row as u32)
            .collect::<Vec<_>>();

        let selection = dictionary.select_is_in(query.iter().map(String::as_str));
        prop_assert_eq!(selection.to_vec(), expected);

        if let Some(first) = query.first() {
            let expected = (0..dictionary.len())
                .filter(|&row| dictionary.value_at(row) == first)
                .map(|row| row as u32)
                .collect::<Vec<_>>();
            prop_assert_eq!(dictionary.is_equal_to(first).to_vec(), expected);
        }
    }

    #[test]
    fn absent_values_select_nothing(rows in rows()) {
        let dictionary = build::<i8>(&rows);
        prop_assert!(dictionary.select_is_in(["zz", "yy", "absent"]).is_empty());
        prop_assert!(dictionary.is_equal_to("absent").is_empty());
    }

    #[test]
    fn counts_sum_to_len(rows in rows()) {
        let dictionary = build::<i16>(&rows);
        let batch = dictionary.count_by_category().unwrap();
        let total: i64 = batch.column(1).as_primitive::<Int64Type>().values().iter().sum();
        prop_assert_eq!(total as usize, dictionary.len());
    }

    #[test]
    fn one_hot_is_total(rows in rows()) {
        let dictionary = build::<i8>(&rows);
        let batch = dictionary.get_dummies().unwrap();
        prop_assert_eq!(batch.num_columns(), dictionary.count_unique());
        prop_assert_eq!(batch.num_rows(), dictionary.len());

        for row in 0..batch.num_rows() {
            let set = batch
                .columns()
                .iter()
                .filter(|column| column.as_boolean().value(row))
                .count();
            prop_assert_eq!(set, 1);
        }
    }

    #[test]
    fn sort_preserves_values(rows in rows()) {
        let mut dictionary = build::<i16>(&rows);
        let mut before = dictionary.to_vec();
        before.sort();

        dictionary.sort_ascending();
        let ascending = dictionary.to_vec();
        prop_assert_eq!(&ascending, &before);

        dictionary.sort_descending();
        let mut descending = dictionary.to_vec();
        descending.reverse();
        prop_assert_eq!(descending, ascending);
    }

    #[test]
    fn bytes_round_trip(rows in rows()) {
        let dictionary = build::<i8>(&rows);
        for row in 0..dictionary.len() {
            let bytes = dictionary.as_bytes(row);
            prop_assert_eq!(bytes.len(), KeyWidth::Narrow.byte_width());
            prop_assert_eq!(
                KeyWidth::Narrow.decode_key(&bytes).unwrap(),
                i32::from(dictionary.key_at(row))
            );
            prop_assert_eq!(i8::from_bytes(&bytes).unwrap(), dictionary.key_at(row));
        }
    }
}
