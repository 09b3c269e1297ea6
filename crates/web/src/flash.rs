//! One-shot session data carried across a redirect.
//!
//! A handler that redirects stores a status message (and, after a rejected
//! submission, the field errors and the submitted input). The next page
//! render takes them out of the session, so they are shown exactly once.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use pessoas_core::{FieldErrors, PersonInput};

use crate::models::session_keys;

/// Status messages shared with every page as the `flash` prop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

impl Flash {
    /// A success message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            error: None,
        }
    }

    /// An error message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: None,
            error: Some(message.into()),
        }
    }
}

/// Everything a page render consumes from the session.
#[derive(Debug, Clone, Default)]
pub struct FlashBag {
    pub flash: Flash,
    pub errors: FieldErrors,
    pub old: Option<PersonInput>,
}

/// Store a status message for the next page.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn push(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}

/// Store a rejected submission for the next render of its form.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn push_rejection(
    session: &Session,
    errors: &FieldErrors,
    old: &PersonInput,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::ERRORS, errors).await?;
    session.insert(session_keys::OLD_INPUT, old).await
}

/// Take every one-shot entry out of the session.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn take(session: &Session) -> Result<FlashBag, tower_sessions::session::Error> {
    let flash = session
        .remove::<Flash>(session_keys::FLASH)
        .await?
        .unwrap_or_default();
    let errors = session
        .remove::<FieldErrors>(session_keys::ERRORS)
        .await?
        .unwrap_or_default();
    let old = session.remove::<PersonInput>(session_keys::OLD_INPUT).await?;

    Ok(FlashBag { flash, errors, old })
}
