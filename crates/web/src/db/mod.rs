//! Person storage.
//!
//! # Tables
//!
//! - `pessoas` - Person records, `cpf` under a unique constraint
//! - `tower_sessions.session` - Session storage shared with the auth layer
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p pessoas-cli -- migrate
//! ```
//!
//! # Backends
//!
//! - [`PersonRepository`] - `PostgreSQL`, used by the service
//! - [`MemoryPersonStore`] - in-process, used by tests and local tooling

pub mod memory;
pub mod people;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use pessoas_core::{PersonFields, PersonId, TaxId};

use crate::models::Person;

pub use memory::MemoryPersonStore;
pub use people::PersonRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate tax id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence operations for person records.
///
/// Implementations must enforce `cpf` uniqueness atomically: of two
/// concurrent writes carrying the same tax id, at most one succeeds and the
/// other returns [`RepositoryError::Conflict`].
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// All people, in insertion order.
    async fn list(&self) -> Result<Vec<Person>, RepositoryError>;

    /// One person by id.
    async fn get(&self, id: PersonId) -> Result<Option<Person>, RepositoryError>;

    /// Whether a tax id is already stored on a row other than `except`.
    async fn cpf_taken(&self, cpf: &TaxId, except: Option<PersonId>)
    -> Result<bool, RepositoryError>;

    /// Insert a new person and return it with its assigned id.
    async fn create(&self, fields: &PersonFields) -> Result<Person, RepositoryError>;

    /// Overwrite the fields of an existing person.
    async fn update(&self, id: PersonId, fields: &PersonFields)
    -> Result<Person, RepositoryError>;

    /// Permanently remove a person.
    async fn delete(&self, id: PersonId) -> Result<(), RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
