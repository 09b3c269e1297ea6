//! Tax identifier (CPF or CNPJ) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TaxId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxIdError {
    /// The input string is empty.
    #[error("tax id cannot be empty")]
    Empty,
    /// The input string is longer than the stored column.
    #[error("tax id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A CPF (individual) or CNPJ (company) number, as typed by the user.
///
/// The value is kept verbatim, punctuation included, because uniqueness is
/// enforced on the stored text. No check-digit validation is applied. 18
/// characters fits a punctuated CNPJ (`00.000.000/0000-00`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaxId(String);

impl TaxId {
    /// Maximum length of a tax id, in characters.
    pub const MAX_LENGTH: usize = 18;

    /// Parse a `TaxId` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`TaxIdError::Empty`] for an empty input and
    /// [`TaxIdError::TooLong`] past [`TaxId::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, TaxIdError> {
        if s.is_empty() {
            return Err(TaxIdError::Empty);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(TaxIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the tax id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TaxId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpf_and_cnpj() {
        assert!(TaxId::parse("123.456.789-00").is_ok());
        assert!(TaxId::parse("12.345.678/0001-90").is_ok());
        assert!(TaxId::parse("12345678900").is_ok());
    }

    #[test]
    fn test_parse_limits() {
        assert_eq!(TaxId::parse(""), Err(TaxIdError::Empty));
        assert_eq!(
            TaxId::parse("12.345.678/0001-901"),
            Err(TaxIdError::TooLong { max: 18 })
        );
    }
}
