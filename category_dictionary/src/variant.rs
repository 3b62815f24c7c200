//! A dictionary of any key width, and promotion between widths.

use arrow::array::DictionaryArray;
use arrow::datatypes::Int32Type;
use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::{DictionaryMap, Error, KeyWidth, Result, Selection};

/// A [`DictionaryMap`] of one of the three key widths.
///
/// Every width supports the same operations. When a width runs out of keys
/// the owner calls [`AnyDictionary::promote`] to obtain an equivalent
/// dictionary of the next width and swaps it in.
#[derive(Debug)]
pub enum AnyDictionary {
    Narrow(DictionaryMap<i8>),
    Medium(DictionaryMap<i16>),
    Wide(DictionaryMap<i32>),
}

macro_rules! dispatch {
    ($self:expr, $dictionary:ident => $body:expr) => {
        match $self {
            Self::Narrow($dictionary) => $body,
            Self::Medium($dictionary) => $body,
            Self::Wide($dictionary) => $body,
        }
    };
}

impl Default for AnyDictionary {
    fn default() -> Self {
        Self::new(KeyWidth::Narrow)
    }
}

impl AnyDictionary {
    /// An empty dictionary of the provided width.
    pub fn new(width: KeyWidth) -> Self {
        match width {
            KeyWidth::Narrow => Self::Narrow(DictionaryMap::new()),
            KeyWidth::Medium => Self::Medium(DictionaryMap::new()),
            KeyWidth::Wide => Self::Wide(DictionaryMap::new()),
        }
    }

    pub fn width(&self) -> KeyWidth {
        dispatch!(self, d => d.width())
    }

    /// Builds a dictionary of the next wider width holding the same values in
    /// the same row order.
    ///
    /// `self` is left untouched. The wide width has nothing to promote to, so
    /// promoting it returns [`Error::CapacityExceeded`].
    pub fn promote(&self) -> Result<Self> {
        let width = self.width();
        debug!(
            from = %width,
            to = ?width.next_wider(),
            rows = self.len(),
            unique = self.count_unique(),
            "promoting dictionary"
        );

        match self {
            Self::Narrow(d) => Ok(Self::Medium(d.replay()?)),
            Self::Medium(d) => Ok(Self::Wide(d.replay()?)),
            Self::Wide(_) => Err(Error::capacity_exceeded(width)),
        }
    }

    pub fn len(&self) -> usize {
        dispatch!(self, d => d.len())
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, d => d.is_empty())
    }

    pub fn append(&mut self, value: Option<&str>) -> Result<()> {
        dispatch!(self, d => d.append(value))
    }

    pub fn append_missing(&mut self) {
        dispatch!(self, d => d.append_missing())
    }

    pub fn set(&mut self, row: usize, value: Option<&str>) -> Result<()> {
        dispatch!(self, d => d.set(row, value))
    }

    pub fn value_at(&self, row: usize) -> &str {
        dispatch!(self, d => d.value_at(row))
    }

    /// The key at `row`, widened to an `i32`.
    pub fn key_at(&self, row: usize) -> i32 {
        dispatch!(self, d => i32::from(d.key_at(row)))
    }

    /// The value for a key previously returned by [`Self::key_at`]. Keys that
    /// do not fit the current width have no value.
    pub fn value_for_key(&self, key: i32) -> Option<&str> {
        match self {
            Self::Narrow(d) => d.value_for_key(i8::try_from(key).ok()?),
            Self::Medium(d) => d.value_for_key(i16::try_from(key).ok()?),
            Self::Wide(d) => d.value_for_key(key),
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        dispatch!(self, d => d.is_missing(row))
    }

    /// See [`DictionaryMap::count_unique`].
    pub fn count_unique(&self) -> usize {
        dispatch!(self, d => d.count_unique())
    }

    pub fn count_missing(&self) -> usize {
        dispatch!(self, d => d.count_missing())
    }

    pub fn count_occurrences(&self, value: &str) -> usize {
        dispatch!(self, d => d.count_occurrences(value))
    }

    pub fn first_index_of(&self, value: &str) -> Option<usize> {
        dispatch!(self, d => d.first_index_of(value))
    }

    pub fn contains(&self, value: &str) -> bool {
        dispatch!(self, d => d.contains(value))
    }

    pub fn categories(&self) -> Vec<&str> {
        dispatch!(self, d => d.categories())
    }

    pub fn clear(&mut self) {
        dispatch!(self, d => d.clear())
    }

    pub fn sort_ascending(&mut self) {
        dispatch!(self, d => d.sort_ascending())
    }

    pub fn sort_descending(&mut self) {
        dispatch!(self, d => d.sort_descending())
    }

    pub fn is_equal_to(&self, value: &str) -> Selection {
        dispatch!(self, d => d.is_equal_to(value))
    }

    pub fn is_not_equal_to(&self, value: &str) -> Selection {
        dispatch!(self, d => d.is_not_equal_to(value))
    }

    pub fn select_is_in<'a, I>(&self, values: I) -> Selection
    where
        I: IntoIterator<Item = &'a str>,
    {
        dispatch!(self, d => d.select_is_in(values))
    }

    pub fn select_is_not_in<'a, I>(&self, values: I) -> Selection
    where
        I: IntoIterator<Item = &'a str>,
    {
        dispatch!(self, d => d.select_is_not_in(values))
    }

    pub fn missing_rows(&self) -> Selection {
        dispatch!(self, d => d.missing_rows())
    }

    pub fn non_missing_rows(&self) -> Selection {
        dispatch!(self, d => d.non_missing_rows())
    }

    pub fn count_by_category(&self) -> Result<RecordBatch> {
        dispatch!(self, d => d.count_by_category())
    }

    pub fn get_dummies(&self) -> Result<RecordBatch> {
        dispatch!(self, d => d.get_dummies())
    }

    /// The key at `row` as big-endian bytes of the current width.
    pub fn as_bytes(&self, row: usize) -> Vec<u8> {
        dispatch!(self, d => d.as_bytes(row))
    }

    pub fn to_arrow(&self) -> Result<DictionaryArray<Int32Type>> {
        dispatch!(self, d => d.to_arrow())
    }

    /// The value of every row in row order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        dispatch!(self, d => Box::new(d.iter()) as Box<dyn Iterator<Item = &str> + '_>)
    }

    pub fn to_vec(&self) -> Vec<String> {
        dispatch!(self, d => d.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: KeyWidth, unique: usize) -> AnyDictionary {
        let mut dictionary = AnyDictionary::new(width);
        for i in 0..unique {
            dictionary.append(Some(&format!("value-{i}"))).unwrap();
        }
        dictionary
    }

    #[test]
    fn dispatches_by_width() {
        for width in KeyWidth::ALL {
            let mut dictionary = AnyDictionary::new(width);
            dictionary.append(Some("a")).unwrap();
            dictionary.append_missing();
            dictionary.append(Some("a")).unwrap();

            assert_eq!(dictionary.width(), width);
            assert_eq!(dictionary.len(), 3);
            assert_eq!(dictionary.count_unique(), 2);
            assert_eq!(dictionary.count_missing(), 1);
            assert_eq!(dictionary.is_equal_to("a").to_vec(), vec![0, 2]);
            assert_eq!(dictionary.as_bytes(0).len(), width.byte_width());
            assert_eq!(
                dictionary.value_for_key(dictionary.key_at(1)),
                Some(crate::MISSING_VALUE_INDICATOR)
            );
            assert_eq!(dictionary.iter().collect::<Vec<_>>(), vec!["a", "", "a"]);
            assert_eq!(dictionary.first_index_of(""), Some(1));
        }
    }

    #[test]
    fn promote_narrow() {
        let mut narrow = filled(KeyWidth::Narrow, KeyWidth::Narrow.max_unique());
        narrow.append_missing();
        narrow.set(3, Some("value-0")).unwrap();

        assert!(matches!(
            narrow.append(Some("one more")),
            Err(Error::KeyExhaustion {
                width: KeyWidth::Narrow,
                ..
            })
        ));

        let mut medium = narrow.promote().unwrap();
        assert_eq!(medium.width(), KeyWidth::Medium);
        assert_eq!(medium.to_vec(), narrow.to_vec());
        assert_eq!(medium.count_missing(), 1);

        medium.append(Some("one more")).unwrap();
        assert_eq!(medium.len(), narrow.len() + 1);
        assert_eq!(medium.value_at(narrow.len()), "one more");

        // the source is left as it was
        assert_eq!(narrow.width(), KeyWidth::Narrow);
        assert_eq!(narrow.len(), 255);
    }

    #[test]
    fn promote_drops_stale_entries() {
        let mut narrow = AnyDictionary::new(KeyWidth::Narrow);
        narrow.append(Some("a")).unwrap();
        narrow.set(0, Some("b")).unwrap();
        assert_eq!(narrow.count_unique(), 2);

        let medium = narrow.promote().unwrap();
        assert_eq!(medium.count_unique(), 1);
        assert!(!medium.contains("a"));
    }

    #[test]
    fn promote_medium() {
        let medium = filled(KeyWidth::Medium, 10);
        let wide = medium.promote().unwrap();

        assert_eq!(wide.width(), KeyWidth::Wide);
        assert_eq!(wide.to_vec(), medium.to_vec());
        assert_eq!(wide.as_bytes(0), vec![0x80, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn wide_cannot_promote() {
        let wide = filled(KeyWidth::Wide, 3);
        assert!(matches!(
            wide.promote(),
            Err(Error::CapacityExceeded {
                width: KeyWidth::Wide,
                max_unique: 4_294_967_294
            })
        ));
    }

    #[test]
    fn narrow_key_lookup_out_of_range() {
        let dictionary = filled(KeyWidth::Narrow, 1);
        assert_eq!(dictionary.value_for_key(-127), Some("value-0"));
        assert_eq!(dictionary.value_for_key(1_000), None);
    }
}
