//! Business services.

pub mod people;

pub use people::{PersonError, PersonService};
