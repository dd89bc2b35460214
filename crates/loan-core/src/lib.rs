//! Domain model for the loan dashboard.
//!
//! Holds the loan record and bucket types, cell coercion rules, the
//! month-name lookup table, presentation descriptors, CLI settings and the
//! shared error type. Nothing in here touches the filesystem except the
//! persisted last-used parameters in [`settings`].

pub mod cells;
pub mod error;
pub mod formatting;
pub mod layout;
pub mod locale;
pub mod models;
pub mod settings;

pub use error::{LoanError, Result};
