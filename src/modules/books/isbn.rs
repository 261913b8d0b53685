//! ISBN-10 / ISBN-13 validation and conversion.
//!
//! Everything here is a pure function over strings. `normalize` is the entry
//! point used by the intake flow; the check-digit and conversion helpers are
//! exposed for reuse and testing.
//!
//! A `979` ISBN-13 has no ISBN-10 form, so `normalize` rejects it with
//! [`IsbnError::NoIsbn10Equivalent`]. Callers that need both forms treat
//! that as an invalid identifier.

use serde::Serialize;
use thiserror::Error;

const ISBN10_LEN: usize = 10;
const ISBN13_LEN: usize = 13;
const BOOKLAND_978: &str = "978";
const BOOKLAND_979: &str = "979";

/// Both canonical forms of one ISBN, without separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IsbnPair {
    pub isbn10: String,
    pub isbn13: String,
}

/// Reasons an identifier is not a usable ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsbnError {
    #[error("expected 10 or 13 characters after removing separators, found {found}")]
    Length { found: usize },

    #[error("unexpected character '{character}'")]
    InvalidCharacter { character: char },

    #[error("ISBN-13 must start with 978 or 979")]
    UnknownPrefix,

    #[error("check digit does not match")]
    Checksum,

    #[error("979-prefixed ISBN-13 has no ISBN-10 form")]
    NoIsbn10Equivalent,
}

/// Validate `raw` and derive both canonical forms.
///
/// Hyphens and spaces are ignored. A lowercase `x` check character is
/// accepted and returned as `X`.
pub fn normalize(raw: &str) -> Result<IsbnPair, IsbnError> {
    let compact = strip_separators(raw);

    if let Some(character) = compact.chars().find(|c| !c.is_ascii_digit() && *c != 'X') {
        return Err(IsbnError::InvalidCharacter { character });
    }

    match compact.len() {
        ISBN10_LEN => {
            validate_isbn10(&compact)?;
            let isbn13 = isbn10_to_isbn13(&compact)?;
            Ok(IsbnPair {
                isbn10: compact,
                isbn13,
            })
        }
        ISBN13_LEN => {
            validate_isbn13(&compact)?;
            let isbn10 = isbn13_to_isbn10(&compact)?;
            Ok(IsbnPair {
                isbn10,
                isbn13: compact,
            })
        }
        found => Err(IsbnError::Length { found }),
    }
}

/// Check character for the first nine digits of an ISBN-10 (mod 11, weights 10..2).
pub fn isbn10_check_digit(body: &str) -> Result<char, IsbnError> {
    let digits = digits_of(body, ISBN10_LEN - 1)?;
    let sum: u32 = digits
        .iter()
        .zip((2..=10).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();

    Ok(match (11 - sum % 11) % 11 {
        10 => 'X',
        value => digit_char(value),
    })
}

/// Check digit for the first twelve digits of an ISBN-13 (mod 10, weights 1,3).
pub fn isbn13_check_digit(body: &str) -> Result<char, IsbnError> {
    let digits = digits_of(body, ISBN13_LEN - 1)?;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(index, digit)| if index % 2 == 0 { *digit } else { digit * 3 })
        .sum();

    Ok(digit_char((10 - sum % 10) % 10))
}

/// Convert a compact ISBN-10 into its `978` ISBN-13.
///
/// Only the first nine characters are read; the ISBN-10 check character is
/// not validated here.
pub fn isbn10_to_isbn13(isbn10: &str) -> Result<String, IsbnError> {
    ensure_ascii(isbn10)?;
    if isbn10.len() != ISBN10_LEN {
        return Err(IsbnError::Length {
            found: isbn10.len(),
        });
    }

    let body = format!("{}{}", BOOKLAND_978, &isbn10[..ISBN10_LEN - 1]);
    let check = isbn13_check_digit(&body)?;
    Ok(format!("{}{}", body, check))
}

/// Convert a compact `978` ISBN-13 into its ISBN-10.
///
/// Only the prefix and the nine body digits are read; the ISBN-13 check digit
/// is not validated here.
pub fn isbn13_to_isbn10(isbn13: &str) -> Result<String, IsbnError> {
    ensure_ascii(isbn13)?;
    if isbn13.len() != ISBN13_LEN {
        return Err(IsbnError::Length {
            found: isbn13.len(),
        });
    }

    match &isbn13[..3] {
        BOOKLAND_978 => {}
        BOOKLAND_979 => return Err(IsbnError::NoIsbn10Equivalent),
        _ => return Err(IsbnError::UnknownPrefix),
    }

    let body = &isbn13[3..ISBN13_LEN - 1];
    let check = isbn10_check_digit(body)?;
    Ok(format!("{}{}", body, check))
}

fn strip_separators(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && *c != ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn ensure_ascii(text: &str) -> Result<(), IsbnError> {
    match text.chars().find(|c| !c.is_ascii()) {
        Some(character) => Err(IsbnError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

fn validate_isbn10(isbn10: &str) -> Result<(), IsbnError> {
    let (body, check) = isbn10.split_at(ISBN10_LEN - 1);
    let expected = isbn10_check_digit(body)?;

    match check.chars().next() {
        Some(c) if c == expected => Ok(()),
        Some(c) if c.is_ascii_digit() || c == 'X' => Err(IsbnError::Checksum),
        Some(character) => Err(IsbnError::InvalidCharacter { character }),
        None => Err(IsbnError::Length { found: isbn10.len() }),
    }
}

fn validate_isbn13(isbn13: &str) -> Result<(), IsbnError> {
    // Reject stray characters before looking at the prefix so the error names them.
    digits_of(isbn13, ISBN13_LEN)?;

    if !isbn13.starts_with(BOOKLAND_978) && !isbn13.starts_with(BOOKLAND_979) {
        return Err(IsbnError::UnknownPrefix);
    }

    let (body, check) = isbn13.split_at(ISBN13_LEN - 1);
    let expected = isbn13_check_digit(body)?;

    if check.starts_with(expected) {
        Ok(())
    } else {
        Err(IsbnError::Checksum)
    }
}

fn digits_of(text: &str, expected_len: usize) -> Result<Vec<u32>, IsbnError> {
    let digits = text
        .chars()
        .map(|character| {
            character
                .to_digit(10)
                .ok_or(IsbnError::InvalidCharacter { character })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if digits.len() != expected_len {
        return Err(IsbnError::Length {
            found: digits.len(),
        });
    }

    Ok(digits)
}

fn digit_char(value: u32) -> char {
    char::from_digit(value, 10).unwrap_or('0')
}
