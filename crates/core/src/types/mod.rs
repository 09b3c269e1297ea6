//! Core types for the person registry.
//!
//! This module provides type-safe wrappers for the domain concepts of a
//! person record.

pub mod email;
pub mod id;
pub mod kind;
pub mod tax_id;

pub use email::{Email, EmailError};
pub use id::*;
pub use kind::{PersonKind, PersonKindError};
pub use tax_id::{TaxId, TaxIdError};
