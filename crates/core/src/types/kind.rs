//! Person kind: individual or corporate.

use serde::{Deserialize, Serialize};

/// Returned when a value is outside the two allowed kinds.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid person kind: {0}")]
pub struct PersonKindError(pub String);

/// Whether a person is an individual (`Física`) or a company (`Jurídica`).
///
/// The textual forms are stored verbatim in `pessoas.tipo` and are the exact
/// values the forms submit; matching is case and accent sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonKind {
    /// Pessoa física, identified by a CPF.
    #[serde(rename = "Física")]
    Individual,
    /// Pessoa jurídica, identified by a CNPJ.
    #[serde(rename = "Jurídica")]
    Corporate,
}

impl PersonKind {
    /// Every allowed kind, in the order the forms list them.
    pub const ALL: [Self; 2] = [Self::Individual, Self::Corporate];

    /// The stored and submitted text of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "Física",
            Self::Corporate => "Jurídica",
        }
    }
}

impl std::fmt::Display for PersonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PersonKind {
    type Err = PersonKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PersonKindError(s.to_owned()))
    }
}
