//! Page responses for the client-side view layer.
//!
//! Every page is a page object `{component, props, url, version}`. A client
//! navigation (`X-Inertia: true`) receives it as JSON; any other request gets
//! an HTML shell that embeds it in `data-page` and loads the client bundle.

use askama::Template;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{Method, StatusCode, header, request::Parts},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

use pessoas_core::FieldErrors;

use crate::flash::{Flash, FlashBag};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Request header marking a client navigation.
pub const INERTIA_HEADER: &str = "x-inertia";
/// Request header carrying the client's asset version.
pub const VERSION_HEADER: &str = "x-inertia-version";
/// Response header telling the client where to reload.
pub const LOCATION_HEADER: &str = "x-inertia-location";

/// Page object sent to the client.
#[derive(Debug, Serialize)]
pub struct Page<'a, P: Serialize> {
    pub component: &'a str,
    pub props: P,
    pub url: &'a str,
    pub version: &'a str,
}

/// Props shared by every page.
#[derive(Debug, Serialize)]
pub struct SharedProps<'a> {
    pub auth: AuthProps<'a>,
    pub flash: &'a Flash,
    pub errors: &'a FieldErrors,
}

#[derive(Debug, Serialize)]
pub struct AuthProps<'a> {
    pub user: Option<&'a CurrentUser>,
}

impl<'a> SharedProps<'a> {
    #[must_use]
    pub const fn new(user: Option<&'a CurrentUser>, bag: &'a FlashBag) -> Self {
        Self {
            auth: AuthProps { user },
            flash: &bag.flash,
            errors: &bag.errors,
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Pessoas</title>
    <script type="module" src="{{ entry|safe }}" defer></script>
</head>
<body>
    <div id="app" data-page="{{ page }}"></div>
</body>
</html>"#,
    ext = "html"
)]
struct ShellTemplate<'a> {
    entry: &'a str,
    page: &'a str,
}

/// Request context needed to answer with a page.
///
/// Extraction fails with `409 Conflict` when a client navigation was built
/// against another asset version, so the client reloads the whole page.
#[derive(Debug, Clone)]
pub struct PageRequest {
    inertia: bool,
    url: String,
    version: String,
    entry: String,
}

impl FromRequestParts<AppState> for PageRequest {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let inertia = parts
            .headers
            .get(INERTIA_HEADER)
            .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"true"));
        let url = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_owned(), |pq| pq.as_str().to_owned());
        let assets = &state.config().assets;

        if inertia && parts.method == Method::GET {
            let client_version = parts
                .headers
                .get(VERSION_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if client_version != assets.version {
                tracing::debug!(client_version, "Asset version changed, forcing reload");
                return Err((StatusCode::CONFLICT, [(LOCATION_HEADER, url)]).into_response());
            }
        }

        Ok(Self {
            inertia,
            url,
            version: assets.version.clone(),
            entry: assets.entry.clone(),
        })
    }
}

impl PageRequest {
    /// Respond with `component` rendered from `props`.
    pub fn render<P: Serialize>(&self, component: &str, props: P) -> Response {
        let page = Page {
            component,
            props,
            url: &self.url,
            version: &self.version,
        };
        let vary = [(header::VARY, INERTIA_HEADER)];

        if self.inertia {
            return (vary, [(INERTIA_HEADER, "true")], Json(page)).into_response();
        }

        let page_json = match serde_json::to_string(&page) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Page serialization error: {e}");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
            }
        };
        let template = ShellTemplate {
            entry: &self.entry,
            page: &page_json,
        };

        (
            vary,
            Html(template.render().unwrap_or_else(|e| {
                tracing::error!("Template render error: {}", e);
                "Internal Server Error".to_string()
            })),
        )
            .into_response()
    }
}
