//! Data layer for the loan dashboard.
//!
//! Reads the loan table from CSV or a workbook, normalises every row into a
//! [`loan_core::models::LoanRecord`], applies the user's filter selection
//! and runs the aggregations that feed the report.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod reader;

pub use loan_core as core;
