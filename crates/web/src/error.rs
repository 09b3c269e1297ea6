//! Unified error handling for the web service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::PersonError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PersonError> for AppError {
    fn from(e: PersonError) -> Self {
        match e {
            PersonError::NotFound(id) => Self::NotFound(format!("pessoa {id}")),
            PersonError::Store(e) => Self::Database(e),
            PersonError::Validation(errors) => Self::Internal(format!("unhandled validation: {errors}")),
        }
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            report(&self);
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::NotFound(_) => "Not found",
            _ => "Internal server error",
        };

        (status, message).into_response()
    }
}

/// Log an error and send it to Sentry.
///
/// Used directly by handlers that recover from a failure with a redirect
/// instead of an error page.
pub fn report(error: &(dyn std::error::Error + 'static)) {
    let event_id = sentry::capture_error(error);
    tracing::error!(
        error = %error,
        sentry_event_id = %event_id,
        "Request error"
    );
}

/// Set the Sentry user context from the session user.
pub fn set_sentry_user(user_id: i64, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: Some(email.to_owned()),
            ..Default::default()
        }));
    });
}
