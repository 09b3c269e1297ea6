//! Person registry web service.
//!
//! Lists, creates, edits and deletes people (`pessoas`) identified by a
//! unique tax id. Pages are page objects consumed by a client-side view
//! layer; login and e-mail verification belong to a separate authentication
//! layer that shares the session store.
//!
//! # Architecture
//!
//! - Axum web framework, tower-sessions backed by `PostgreSQL`
//! - [`services::PersonService`] applies the validation rules over any
//!   [`db::PersonStore`]
//! - [`views::PageRequest`] answers with JSON or an askama HTML shell

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;
