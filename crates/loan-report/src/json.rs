//! JSON rendering of the full report.

use loan_core::Result;
use loan_data::analysis::DashboardReport;

/// Serialize `report` as pretty-printed JSON.
///
/// Amounts serialize as decimal strings so no precision is lost on the way
/// to the renderer.
pub fn render_json(report: &DashboardReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Print [`render_json`] to stdout.
pub fn print_json(report: &DashboardReport) -> Result<()> {
    println!("{}", render_json(report)?);
    Ok(())
}
