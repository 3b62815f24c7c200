//! Key widths and the integer types used as dictionary keys.
//!
//! Every width reserves the top of its range for the missing sentinel and the
//! bottom value as the counter's starting point, so the usable keys for a
//! width are `[T::MIN + 1, T::MAX)`.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use crate::{Error, Result};

/// The capacity class of a dictionary, determined by the size of its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyWidth {
    /// One byte keys.
    Narrow,
    /// Two byte keys.
    Medium,
    /// Four byte keys. There is no wider width.
    Wide,
}

impl KeyWidth {
    /// All widths, narrowest first.
    pub const ALL: [Self; 3] = [Self::Narrow, Self::Medium, Self::Wide];

    /// The number of bytes in a key of this width.
    pub fn byte_width(&self) -> usize {
        match self {
            Self::Narrow => i8::BYTE_WIDTH,
            Self::Medium => i16::BYTE_WIDTH,
            Self::Wide => i32::BYTE_WIDTH,
        }
    }

    /// The maximum number of distinct non-missing categories a dictionary of
    /// this width can hold.
    pub fn max_unique(&self) -> usize {
        match self {
            Self::Narrow => i8::max_unique(),
            Self::Medium => i16::max_unique(),
            Self::Wide => i32::max_unique(),
        }
    }

    /// The width a dictionary of this width is promoted to when its keys are
    /// exhausted.
    pub fn next_wider(&self) -> Option<Self> {
        match self {
            Self::Narrow => Some(Self::Medium),
            Self::Medium => Some(Self::Wide),
            Self::Wide => None,
        }
    }

    /// Decodes a big-endian key of this width, widened to an `i32`.
    pub fn decode_key(&self, bytes: &[u8]) -> Result<i32> {
        Ok(match self {
            Self::Narrow => i32::from(i8::from_bytes(bytes)?),
            Self::Medium => i32::from(i16::from_bytes(bytes)?),
            Self::Wide => i32::from_bytes(bytes)?,
        })
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Narrow => "narrow",
            Self::Medium => "medium",
            Self::Wide => "wide",
        }
    }
}

impl Display for KeyWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyWidth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "narrow" | "byte" | "i8" => Ok(Self::Narrow),
            "medium" | "short" | "i16" => Ok(Self::Medium),
            "wide" | "int" | "i32" => Ok(Self::Wide),
            _ => Err(Error::UnknownKeyWidth { name: s.to_string() }),
        }
    }
}

/// An integer type usable as a dictionary key.
///
/// Implemented for `i8`, `i16` and `i32`, which back the narrow, medium and
/// wide dictionaries.
pub trait CategoryKey:
    Copy + Eq + Ord + Hash + Debug + Display + Send + Sync + 'static
{
    /// The width of this key type.
    const WIDTH: KeyWidth;

    /// Number of bytes in the big-endian encoding of a key.
    const BYTE_WIDTH: usize;

    /// Value of the allocation counter before the first key is issued.
    const COUNTER_START: Self;

    /// The first key the counter issues.
    const MIN_KEY: Self;

    /// Reserved key for the missing value. Never issued by the counter.
    const MISSING: Self;

    /// Returns the key following `counter`, or `None` if that key would be
    /// the missing sentinel.
    fn next(counter: Self) -> Option<Self>;

    /// Widens the key to an `i64`.
    fn as_i64(self) -> i64;

    /// Big-endian bytes of this key.
    fn to_bytes(self) -> Vec<u8>;

    /// Decodes a key from exactly [`Self::BYTE_WIDTH`] big-endian bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    /// `MISSING - MIN_KEY`
    fn max_unique() -> usize {
        (Self::MISSING.as_i64() - Self::MIN_KEY.as_i64()) as usize
    }
}

macro_rules! impl_category_key {
    ($t:ty, $width:expr) => {
        impl CategoryKey for $t {
            const WIDTH: KeyWidth = $width;
            const BYTE_WIDTH: usize = std::mem::size_of::<$t>();
            const COUNTER_START: Self = <$t>::MIN;
            const MIN_KEY: Self = <$t>::MIN + 1;
            const MISSING: Self = <$t>::MAX;

            fn next(counter: Self) -> Option<Self> {
                counter
                    .checked_add(1)
                    .filter(|next| *next < Self::MISSING)
            }

            fn as_i64(self) -> i64 {
                i64::from(self)
            }

            fn to_bytes(self) -> Vec<u8> {
                self.to_be_bytes().to_vec()
            }

            fn from_bytes(bytes: &[u8]) -> Result<Self> {
                let bytes: [u8; std::mem::size_of::<$t>()] =
                    bytes.try_into().map_err(|_| Error::InvalidKeyBytes {
                        width: Self::WIDTH,
                        expected: Self::BYTE_WIDTH,
                        actual: bytes.len(),
                    })?;
                Ok(<$t>::from_be_bytes(bytes))
            }
        }
    };
}

impl_category_key!(i8, KeyWidth::Narrow);
impl_category_key!(i16, KeyWidth::Medium);
impl_category_key!(i32, KeyWidth::Wide);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_ranges() {
        assert_eq!(KeyWidth::Narrow.max_unique(), 254);
        assert_eq!(KeyWidth::Medium.max_unique(), 65_534);
        assert_eq!(KeyWidth::Wide.max_unique(), 4_294_967_294);

        assert_eq!(i8::next(i8::COUNTER_START), Some(i8::MIN_KEY));
        assert_eq!(i8::next(i8::MAX - 2), Some(i8::MAX - 1));
        assert_eq!(i8::next(i8::MAX - 1), None);
        assert_eq!(i16::next(i16::MAX - 1), None);
        assert_eq!(i32::next(i32::MAX - 1), None);
    }

    #[test]
    fn promotion_order() {
        assert_eq!(KeyWidth::Narrow.next_wider(), Some(KeyWidth::Medium));
        assert_eq!(KeyWidth::Medium.next_wider(), Some(KeyWidth::Wide));
        assert_eq!(KeyWidth::Wide.next_wider(), None);
        assert!(KeyWidth::Narrow < KeyWidth::Wide);
    }

    #[test]
    fn bytes() {
        assert_eq!((-2_i8).to_bytes(), vec![0xfe]);
        assert_eq!(258_i16.to_bytes(), vec![0x01, 0x02]);
        assert_eq!(i32::MIN_KEY.to_bytes(), vec![0x80, 0x00, 0x00, 0x01]);

        assert_eq!(KeyWidth::Medium.decode_key(&[0x01, 0x02]).unwrap(), 258);
        assert_eq!(KeyWidth::Narrow.decode_key(&[0x7f]).unwrap(), 127);

        let err = KeyWidth::Wide.decode_key(&[0x01]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidKeyBytes {
                width: KeyWidth::Wide,
                expected: 4,
                actual: 1
            }
        ));
    }

    #[test]
    fn parse_width() {
        assert_eq!("narrow".parse::<KeyWidth>().unwrap(), KeyWidth::Narrow);
        assert_eq!(" Short ".parse::<KeyWidth>().unwrap(), KeyWidth::Medium);
        assert_eq!("INT".parse::<KeyWidth>().unwrap(), KeyWidth::Wide);
        for width in KeyWidth::ALL {
            assert_eq!(width.to_string().parse::<KeyWidth>().unwrap(), width);
        }
        assert!(matches!(
            "huge".parse::<KeyWidth>(),
            Err(Error::UnknownKeyWidth { name }) if name == "huge"
        ));
    }
}
