//! Output layer for the loan dashboard.
//!
//! Turns a [`loan_data::analysis::DashboardReport`] into a plain-text console
//! summary, a JSON document for an external renderer, or a set of CSV files.

pub mod console;
pub mod export;
pub mod json;

pub use loan_core as core;
