//! Integration tests for the person registry.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests (no database needed)
//! cargo test -p pessoas-integration-tests
//!
//! # Tests against a running server and database
//! cargo test -p pessoas-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] drives the real router in process with the in-memory person
//! store and an in-memory session store. It keeps the session cookie between
//! requests like a browser, and exposes a login route that writes the session
//! user the way the authentication layer does.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
    routing::post,
};
use chrono::Utc;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session};

use pessoas_web::config::PessoasConfig;
use pessoas_web::db::{MemoryPersonStore, PersonStore};
use pessoas_web::middleware::{session::session_layer, set_current_user};
use pessoas_web::models::CurrentUser;
use pessoas_web::routes;
use pessoas_web::state::AppState;
use pessoas_web::views::{INERTIA_HEADER, VERSION_HEADER};

/// Route that puts a user into the session.
pub const TEST_LOGIN_PATH: &str = "/__test/login";

/// A captured response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// The redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// The body as text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// In-process application with a browser-like cookie jar.
pub struct TestApp {
    router: Router,
    store: Arc<MemoryPersonStore>,
    config: PessoasConfig,
    cookie: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// A fresh application with an empty store and no session.
    #[must_use]
    pub fn new() -> Self {
        let config = PessoasConfig::with_defaults(SecretString::from("postgres://unused"));
        let store = Arc::new(MemoryPersonStore::new());
        let sessions = session_layer(MemoryStore::default(), &config);

        let state = AppState::new(config.clone(), store.clone());
        let login = Router::new()
            .route(TEST_LOGIN_PATH, post(login))
            .layer(sessions.clone());
        let router = routes::app(state, sessions).merge(login);

        Self {
            router,
            store,
            config,
            cookie: None,
        }
    }

    /// A fresh application with a verified user logged in.
    pub async fn logged_in() -> Self {
        let mut app = Self::new();
        app.login(true).await;
        app
    }

    /// The person store behind the router.
    #[must_use]
    pub fn store(&self) -> &MemoryPersonStore {
        &self.store
    }

    /// Number of stored people.
    pub async fn count(&self) -> usize {
        self.store.list().await.unwrap().len()
    }

    /// The configuration the router was built with.
    #[must_use]
    pub const fn config(&self) -> &PessoasConfig {
        &self.config
    }

    /// Log in a user, verified or not.
    pub async fn login(&mut self, verified: bool) {
        let user = CurrentUser {
            id: 1,
            name: "Maria Teste".to_owned(),
            email: "maria@example.com".to_owned(),
            email_verified_at: verified.then(Utc::now),
        };
        let body = serde_json::to_vec(&user).unwrap();
        let response = self
            .send(Method::POST, TEST_LOGIN_PATH, Some(("application/json", body)), &[])
            .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
    }

    /// Drop the session cookie, like a browser that never logged in.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    /// Plain browser GET.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, &[]).await
    }

    /// Client-side navigation GET, with the current asset version.
    pub async fn visit(&mut self, path: &str) -> TestResponse {
        let version = self.config.assets.version.clone();
        self.send(
            Method::GET,
            path,
            None,
            &[(INERTIA_HEADER, "true"), (VERSION_HEADER, &version)],
        )
        .await
    }

    /// Client-side navigation returning the page object.
    pub async fn page(&mut self, path: &str) -> Value {
        let response = self.visit(path).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        response.json()
    }

    /// Submit JSON the way the client-side forms do.
    pub async fn submit(&mut self, method: Method, path: &str, body: &Value) -> TestResponse {
        let version = self.config.assets.version.clone();
        let body = serde_json::to_vec(body).unwrap();
        self.send(
            method,
            path,
            Some(("application/json", body)),
            &[(INERTIA_HEADER, "true"), (VERSION_HEADER, &version)],
        )
        .await
    }

    /// Submit a urlencoded HTML form.
    pub async fn submit_form(&mut self, path: &str, form: &str) -> TestResponse {
        self.send(
            Method::POST,
            path,
            Some(("application/x-www-form-urlencoded", form.as_bytes().to_vec())),
            &[],
        )
        .await
    }

    /// DELETE a resource.
    pub async fn delete(&mut self, path: &str) -> TestResponse {
        self.send(Method::DELETE, path, None, &[(INERTIA_HEADER, "true")])
            .await
    }

    /// Send a request and remember any session cookie it sets.
    pub async fn send(
        &mut self,
        method: Method,
        path: &str,
        body: Option<(&str, Vec<u8>)>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some((content_type, bytes)) => request
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(bytes)),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default().to_owned();
            let expired = set_cookie.to_ascii_lowercase().contains("max-age=0");
            self.cookie = (!expired).then_some(pair);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

async fn login(session: Session, Json(user): Json<CurrentUser>) -> StatusCode {
    match set_current_user(&session, &user).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A valid submission for tax id `cpf`.
#[must_use]
pub fn person_json(cpf: &str) -> Value {
    serde_json::json!({
        "nome": "Ana Silva",
        "cpf": cpf,
        "tipo": "Física",
        "telefone": "11999999999",
        "email": "ana@example.com",
    })
}
