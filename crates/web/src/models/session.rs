//! Session-related types.
//!
//! The session is written by the authentication layer; this service only
//! reads the identity and keeps its own one-shot (flash) entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session-stored user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User id in the authentication store.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login e-mail.
    pub email: String,
    /// When the e-mail was verified; `None` until the user confirms it.
    pub email_verified_at: Option<DateTime<Utc>>,
}

impl CurrentUser {
    /// Whether the user completed e-mail verification.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }
}

/// Session keys.
pub mod keys {
    /// Key for the logged-in user, set by the authentication layer.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the one-shot status message (`success` / `error`).
    pub const FLASH: &str = "_flash";

    /// Key for the field errors of the last rejected submission.
    pub const ERRORS: &str = "_errors";

    /// Key for the input of the last rejected submission.
    pub const OLD_INPUT: &str = "_old_input";
}
