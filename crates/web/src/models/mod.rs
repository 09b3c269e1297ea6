//! Domain models for the person registry.

pub mod person;
pub mod session;

pub use person::Person;
pub use session::{CurrentUser, keys as session_keys};
