//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` (`tower_sessions.session`) so the
//! authentication layer and this service see the same logged-in user.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::PessoasConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pessoas_session";

/// Session expiry time in seconds (2 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 2 * 60 * 60;

/// Create the session layer with the `PostgreSQL` store.
///
/// The store uses its default `tower_sessions.session` table, created by
/// the migrations.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &PessoasConfig,
) -> SessionManagerLayer<PostgresStore> {
    session_layer(PostgresStore::new(pool.clone()), config)
}

/// Configure a session layer over any store.
#[must_use]
pub fn session_layer<S: SessionStore>(store: S, config: &PessoasConfig) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
