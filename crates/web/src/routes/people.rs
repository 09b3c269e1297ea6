//! Person pages and mutations.
//!
//! Mutations always answer with a `303 See Other` redirect carrying a flash
//! message; store failures are reported and turned into a generic message
//! instead of an error page.

use axum::{
    Form, Json,
    extract::{FromRequest, Path, Request, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use pessoas_core::{PersonId, PersonInput};

use crate::error::{AppError, report};
use crate::flash::{self, Flash};
use crate::middleware::{OptionalUser, RequireVerifiedUser};
use crate::models::{CurrentUser, Person};
use crate::services::PersonError;
use crate::state::AppState;
use crate::views::{PageRequest, SharedProps};

/// List page path.
pub const INDEX_PATH: &str = "/pessoas";
/// New-person form path.
pub const NEW_FORM_PATH: &str = "/pessoas/manutencao";

const INDEX_COMPONENT: &str = "pessoas/Index";
const FORM_COMPONENT: &str = "pessoas/Manutencao";

/// Flash texts shown after a mutation.
pub mod messages {
    pub const CREATED: &str = "Pessoa cadastrada com sucesso.";
    pub const UPDATED: &str = "Pessoa atualizada com sucesso.";
    pub const DELETED: &str = "Pessoa removida com sucesso.";
    pub const INVALID: &str = "Verifique os campos destacados.";
    pub const CREATE_FAILED: &str = "Erro ao cadastrar pessoa.";
    pub const UPDATE_FAILED: &str = "Erro ao atualizar pessoa.";
    pub const DELETE_FAILED: &str = "Erro ao remover pessoa.";
}

/// Edit form path for one person.
#[must_use]
pub fn edit_path(id: PersonId) -> String {
    format!("/pessoas/edit/{id}")
}

/// Only plain digit strings name a person.
fn parse_id(raw: &str) -> Result<PersonId, AppError> {
    let not_found = || AppError::NotFound(format!("pessoa {raw}"));
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_found());
    }
    raw.parse().map_err(|_| not_found())
}

// =============================================================================
// Request body
// =============================================================================

/// Submitted person fields, as JSON (client navigation) or a urlencoded form.
pub struct PersonPayload(pub PersonInput);

impl<S> FromRequest<S> for PersonPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let input = if is_json {
            let Json(input) = Json::<PersonInput>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            input
        } else {
            let Form(input) = Form::<PersonInput>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            input
        };

        Ok(Self(input))
    }
}

// =============================================================================
// Page props
// =============================================================================

#[derive(Serialize)]
struct IndexProps<'a> {
    #[serde(flatten)]
    shared: SharedProps<'a>,
    pessoas: &'a [Person],
}

#[derive(Serialize)]
struct FormProps<'a> {
    #[serde(flatten)]
    shared: SharedProps<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pessoa: Option<&'a Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    old: Option<&'a PersonInput>,
}

// =============================================================================
// Pages
// =============================================================================

/// GET /
///
/// The list, open to anonymous visitors.
#[instrument(skip_all)]
pub async fn home(
    OptionalUser(user): OptionalUser,
    State(state): State<AppState>,
    session: Session,
    page: PageRequest,
) -> Result<Response, AppError> {
    list_page(user.as_ref(), &state, &session, &page).await
}

/// GET /pessoas
#[instrument(skip_all)]
pub async fn index(
    RequireVerifiedUser(user): RequireVerifiedUser,
    State(state): State<AppState>,
    session: Session,
    page: PageRequest,
) -> Result<Response, AppError> {
    list_page(Some(&user), &state, &session, &page).await
}

async fn list_page(
    user: Option<&CurrentUser>,
    state: &AppState,
    session: &Session,
    page: &PageRequest,
) -> Result<Response, AppError> {
    let pessoas = state.people().list().await?;
    let bag = flash::take(session).await?;

    Ok(page.render(
        INDEX_COMPONENT,
        IndexProps {
            shared: SharedProps::new(user, &bag),
            pessoas: &pessoas,
        },
    ))
}

/// GET /pessoas/manutencao
#[instrument(skip_all)]
pub async fn manutencao(
    RequireVerifiedUser(user): RequireVerifiedUser,
    session: Session,
    page: PageRequest,
) -> Result<Response, AppError> {
    let bag = flash::take(&session).await?;

    Ok(page.render(
        FORM_COMPONENT,
        FormProps {
            shared: SharedProps::new(Some(&user), &bag),
            pessoa: None,
            old: bag.old.as_ref(),
        },
    ))
}

/// GET /pessoas/edit/{id}
#[instrument(skip_all, fields(id = %id))]
pub async fn edit(
    RequireVerifiedUser(user): RequireVerifiedUser,
    State(state): State<AppState>,
    session: Session,
    page: PageRequest,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let pessoa = state.people().find(id).await?;
    let bag = flash::take(&session).await?;

    Ok(page.render(
        FORM_COMPONENT,
        FormProps {
            shared: SharedProps::new(Some(&user), &bag),
            pessoa: Some(&pessoa),
            old: bag.old.as_ref(),
        },
    ))
}

// =============================================================================
// Mutations
// =============================================================================

/// POST /pessoas
#[instrument(skip_all)]
pub async fn store(
    RequireVerifiedUser(_user): RequireVerifiedUser,
    State(state): State<AppState>,
    session: Session,
    PersonPayload(input): PersonPayload,
) -> Result<Redirect, AppError> {
    match state.people().create(&input).await {
        Ok(_) => {
            flash::push(&session, Flash::success(messages::CREATED)).await?;
            Ok(Redirect::to(INDEX_PATH))
        }
        Err(PersonError::Validation(errors)) => {
            flash::push_rejection(&session, &errors, &input).await?;
            flash::push(&session, Flash::error(messages::INVALID)).await?;
            Ok(Redirect::to(NEW_FORM_PATH))
        }
        Err(e) => {
            report(&e);
            flash::push(&session, Flash::error(messages::CREATE_FAILED)).await?;
            Ok(Redirect::to(NEW_FORM_PATH))
        }
    }
}

/// PUT /pessoas/edit/{id}
#[instrument(skip_all, fields(id = %id))]
pub async fn update(
    RequireVerifiedUser(_user): RequireVerifiedUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    PersonPayload(input): PersonPayload,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id)?;

    match state.people().update(id, &input).await {
        Ok(_) => {
            flash::push(&session, Flash::success(messages::UPDATED)).await?;
            Ok(Redirect::to(INDEX_PATH))
        }
        Err(PersonError::Validation(errors)) => {
            flash::push_rejection(&session, &errors, &input).await?;
            flash::push(&session, Flash::error(messages::INVALID)).await?;
            Ok(Redirect::to(&edit_path(id)))
        }
        Err(e @ PersonError::NotFound(_)) => Err(e.into()),
        Err(e) => {
            report(&e);
            flash::push(&session, Flash::error(messages::UPDATE_FAILED)).await?;
            Ok(Redirect::to(INDEX_PATH))
        }
    }
}

/// DELETE /pessoas/{id}
#[instrument(skip_all, fields(id = %id))]
pub async fn destroy(
    RequireVerifiedUser(_user): RequireVerifiedUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id)?;

    match state.people().delete(id).await {
        Ok(()) => {
            flash::push(&session, Flash::success(messages::DELETED)).await?;
            Ok(Redirect::to(INDEX_PATH))
        }
        Err(e @ PersonError::NotFound(_)) => Err(e.into()),
        Err(e) => {
            report(&e);
            flash::push(&session, Flash::error(messages::DELETE_FAILED)).await?;
            Ok(Redirect::to(INDEX_PATH))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").ok(), Some(PersonId::new(42)));
        assert_eq!(parse_id("007").ok(), Some(PersonId::new(7)));
        for raw in ["abc", "", "1.5", "99999999999", "+5", "-5", " 5"] {
            let err = parse_id(raw).err();
            assert!(
                matches!(err, Some(AppError::NotFound(_))),
                "{raw:?} should be not found"
            );
        }
    }

    #[test]
    fn test_not_found_id_is_404() {
        let response = parse_id("x").err().map(IntoResponse::into_response);
        assert_eq!(response.map(|r| r.status()), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_edit_path() {
        assert_eq!(edit_path(PersonId::new(7)), "/pessoas/edit/7");
    }
}
