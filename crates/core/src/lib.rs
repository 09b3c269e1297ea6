//! Pessoas Core - Shared types library.
//!
//! This crate provides the types and validation rules used across all
//! components of the person registry:
//! - `web` - The HTTP service (listing, forms, create/update/delete)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Rules that need the store (tax id uniqueness) live in the
//! web crate's service layer.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, tax ids and person kinds
//! - [`validation`] - Field rules and pt-BR messages for person submissions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldErrors, PersonField, PersonFields, PersonInput, RawValue};
