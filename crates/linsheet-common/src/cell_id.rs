//! Compact cell identifiers.
//!
//! A [`CellId`] packs a column letter and a row number into 32 bits so the
//! engine can use it as a cheap `Copy` map key. The engine never looks inside;
//! it only compares and hashes ids. Conversion to and from the display form
//! (`A12`, `Z7`) lives here and nowhere else.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

const NUMBER_BITS: u32 = 24;
const NUMBER_MAX: u32 = (1 << NUMBER_BITS) - 1;
const LETTER_SHIFT: u32 = NUMBER_BITS;
const LETTER_MAX: u8 = 25;

const NUMBER_MASK: u32 = NUMBER_MAX;
const LETTER_MASK: u32 = 0xFF << LETTER_SHIFT;

/// Errors returned when building or parsing a [`CellId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellIdError {
    #[error("cell name is empty")]
    Empty,
    #[error("cell name must start with a letter A-Z, found {0:?}")]
    InvalidLetter(char),
    #[error("cell name {0:?} has no row number")]
    MissingNumber(String),
    #[error("cell name {0:?} has a non-numeric row part")]
    InvalidNumber(String),
    #[error("row number {0} exceeds 16777215")]
    NumberOverflow(u64),
    #[error("packed cell id contains reserved bits: {0:#x}")]
    ReservedBitsSet(u32),
}

/// Opaque, totally ordered cell identifier.
///
/// Layout (32 bits):
/// [31:24] Letter index (0 = `A` .. 25 = `Z`)
/// [23:0]  Row number (0 to 16,777,215)
///
/// Ordering follows the packed value, so all `A` cells sort before all `B`
/// cells and numbers sort numerically within a letter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    /// Construct an id from a letter index and row number, panicking if either
    /// is out of range.
    pub fn new(letter: u8, number: u32) -> Self {
        assert!(letter <= LETTER_MAX, "Letter index {letter} exceeds {LETTER_MAX}");
        assert!(number <= NUMBER_MAX, "Number {number} exceeds 24 bits");
        Self(((letter as u32) << LETTER_SHIFT) | number)
    }

    /// Fallible constructor that takes the letter as a character.
    pub fn try_new(letter: char, number: u32) -> Result<Self, CellIdError> {
        if !letter.is_ascii_alphabetic() {
            return Err(CellIdError::InvalidLetter(letter));
        }
        if number > NUMBER_MAX {
            return Err(CellIdError::NumberOverflow(number as u64));
        }
        let index = letter.to_ascii_uppercase() as u8 - b'A';
        Ok(Self::new(index, number))
    }

    /// Reconstruct from a raw packed value.
    pub fn from_raw(raw: u32) -> Result<Self, CellIdError> {
        if (raw & LETTER_MASK) >> LETTER_SHIFT > LETTER_MAX as u32 {
            return Err(CellIdError::ReservedBitsSet(raw & LETTER_MASK));
        }
        Ok(Self(raw))
    }

    #[inline(always)]
    pub fn letter(self) -> char {
        (b'A' + ((self.0 & LETTER_MASK) >> LETTER_SHIFT) as u8) as char
    }

    #[inline(always)]
    pub fn number(self) -> u32 {
        self.0 & NUMBER_MASK
    }

    #[inline(always)]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter(), self.number())
    }
}

impl FromStr for CellId {
    type Err = CellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars.next().ok_or(CellIdError::Empty)?;
        if !letter.is_ascii_alphabetic() {
            return Err(CellIdError::InvalidLetter(letter));
        }
        let digits = chars.as_str();
        if digits.is_empty() {
            return Err(CellIdError::MissingNumber(s.to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CellIdError::InvalidNumber(s.to_string()));
        }
        let number: u64 = digits
            .parse()
            .map_err(|_| CellIdError::NumberOverflow(u64::MAX))?;
        if number > NUMBER_MAX as u64 {
            return Err(CellIdError::NumberOverflow(number));
        }
        Self::try_new(letter, number as u32)
    }
}

impl TryFrom<&str> for CellId {
    type Error = CellIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CellId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CellId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
