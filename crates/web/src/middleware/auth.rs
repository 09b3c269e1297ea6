//! Authentication extractors.
//!
//! Login and e-mail verification belong to a separate authentication layer
//! that writes the user into the shared session. Person routes only check
//! that a verified user is present.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in user with a verified e-mail.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireVerifiedUser(user): RequireVerifiedUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireVerifiedUser(pub CurrentUser);

/// Why a request was refused by [`RequireVerifiedUser`].
#[derive(Debug)]
pub enum AuthRejection {
    /// No user in the session; redirect to the login page.
    RedirectToLogin(String),
    /// User has not verified the e-mail; redirect to the verification notice.
    RedirectToVerify(String),
    /// The session layer is missing from the router.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(to) | Self::RedirectToVerify(to) => {
                Redirect::to(&to).into_response()
            }
            Self::MissingSession => {
                tracing::error!("Session layer not installed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl FromRequestParts<AppState> for RequireVerifiedUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AuthRejection::RedirectToLogin(state.config().login_path.clone()))?;

        if !user.is_verified() {
            return Err(AuthRejection::RedirectToVerify(
                state.config().verify_path.clone(),
            ));
        }

        set_sentry_user(user.id, &user.email);
        Ok(Self(user))
    }
}

/// Extractor that reads the current user without rejecting the request.
///
/// Unverified users are treated as absent.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalUser(user): OptionalUser) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten()
                .filter(CurrentUser::is_verified),
            None => None,
        };

        if let Some(user) = &user {
            set_sentry_user(user.id, &user.email);
        }
        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}
