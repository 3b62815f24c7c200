//! Dictionary-encoded categorical string columns.
//!
//! A column of repeated strings is stored as one small integer key per row,
//! with each distinct string held once in a bijective key/value dictionary.
//! Dictionaries come in three key widths ([`KeyWidth`]); an owning
//! [`StringColumn`] promotes its dictionary to the next width when the keys of
//! the current one are exhausted.
//!
//! None of the types here synchronise internally. A dictionary or column has a
//! single writer: mutations must not run concurrently with each other or with
//! reads of the same instance. Callers that need shared access wrap the column
//! in a lock of their choosing or shard columns across partitions.

use arrow::error::ArrowError;

mod analytics;
mod bijection;
mod column;
mod dictionary;
mod key;
mod selection;
mod variant;

pub mod test_util;

pub use analytics::{CATEGORY_COLUMN_NAME, COUNT_COLUMN_NAME, MISSING_CATEGORY_LABEL};
pub use bijection::Bijection;
pub use column::{ColumnOptions, StringColumn, TABLE_NAME_METADATA_KEY};
pub use dictionary::{DictionaryMap, Values};
pub use key::{CategoryKey, KeyWidth};
pub use selection::Selection;
pub use variant::AnyDictionary;

/// The string stored for, and returned by, missing cells.
pub const MISSING_VALUE_INDICATOR: &str = "";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{width} dictionary can only contain {max_unique} unique values")]
    KeyExhaustion { width: KeyWidth, max_unique: usize },

    #[error(
        "column cannot hold more than {max_unique} unique values: no key width wider than {width} is available"
    )]
    CapacityExceeded { width: KeyWidth, max_unique: usize },

    #[error("invalid {width} key: expected {expected} bytes, got {actual}")]
    InvalidKeyBytes {
        width: KeyWidth,
        expected: usize,
        actual: usize,
    },

    #[error("unknown key width '{name}', expected one of: narrow, medium, wide")]
    UnknownKeyWidth { name: String },

    #[error("initial key width {initial} is wider than the maximum key width {max}")]
    InvalidWidthRange { initial: KeyWidth, max: KeyWidth },

    #[error("error constructing arrow data: {source}")]
    CreatingArrowArray { source: ArrowError },
}

impl Error {
    pub(crate) fn key_exhaustion(width: KeyWidth) -> Self {
        Self::KeyExhaustion {
            width,
            max_unique: width.max_unique(),
        }
    }

    pub(crate) fn capacity_exceeded(width: KeyWidth) -> Self {
        Self::CapacityExceeded {
            width,
            max_unique: width.max_unique(),
        }
    }
}

impl From<ArrowError> for Error {
    fn from(source: ArrowError) -> Self {
        Self::CreatingArrowArray { source }
    }
}

/// A specialized `Result` for dictionary errors
pub type Result<T, E = Error> = std::result::Result<T, E>;
