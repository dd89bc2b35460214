//! CSV export of the report tables.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::Writer;
use loan_core::models::LoanRecord;
use loan_core::Result;
use loan_data::analysis::DashboardReport;
use rust_decimal::Decimal;
use tracing::info;

pub const MONTHLY_SUMMARY_FILENAME: &str = "monthly_summary.csv";
pub const CAMPUS_SUMMARY_FILENAME: &str = "campus_summary.csv";
pub const PENDING_ROLLUP_FILENAME: &str = "pending_rollup.csv";
pub const FILTERED_LOANS_FILENAME: &str = "filtered_loans.csv";

/// Write every CSV table into `output_dir`, creating it if needed.
///
/// Returns the written paths in a fixed order.
pub fn write_csv_reports(output_dir: &Path, report: &DashboardReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let paths = vec![
        write_monthly_summary(output_dir, report)?,
        write_campus_summary(output_dir, report)?,
        write_pending_rollup(output_dir, report)?,
        write_filtered_loans(output_dir, &report.loans)?,
    ];

    info!("Wrote {} CSV files to {}", paths.len(), output_dir.display());
    Ok(paths)
}

/// One row per month of the chart, chronological.
fn write_monthly_summary(output_dir: &Path, report: &DashboardReport) -> Result<PathBuf> {
    let path = output_dir.join(MONTHLY_SUMMARY_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([
        "Year",
        "Month",
        "Label",
        "Interest",
        "Commission",
        "Total_Gain",
        "Loans",
    ])?;

    for bucket in &report.chart_months {
        wtr.write_record([
            bucket.year.to_string(),
            bucket.month.to_string(),
            bucket.display_label.clone(),
            bucket.interest.to_string(),
            bucket.commission.to_string(),
            bucket.total_gain.to_string(),
            bucket.loans.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(path)
}

fn write_campus_summary(output_dir: &Path, report: &DashboardReport) -> Result<PathBuf> {
    let path = output_dir.join(CAMPUS_SUMMARY_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([
        "Campus",
        "Interest",
        "Commission",
        "Total_Gain",
        "Share_Pct",
        "Loans",
    ])?;

    for bucket in &report.campuses {
        wtr.write_record([
            bucket.campus.clone(),
            bucket.interest.to_string(),
            bucket.commission.to_string(),
            bucket.total_gain.to_string(),
            bucket.share_pct.to_string(),
            bucket.loans.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(path)
}

/// Borrower rows, a subtotal row per campus and a final total row.
fn write_pending_rollup(output_dir: &Path, report: &DashboardReport) -> Result<PathBuf> {
    let path = output_dir.join(PENDING_ROLLUP_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Campus", "Borrower", "Installments", "Loans"])?;

    let rollup = &report.pending_rollup;
    for campus in &rollup.campuses {
        let mut loans = 0u32;
        for borrower in &campus.borrowers {
            loans += borrower.loans;
            wtr.write_record([
                campus.campus.clone(),
                borrower.borrower.clone(),
                borrower.installments.to_string(),
                borrower.loans.to_string(),
            ])?;
        }
        wtr.write_record([
            campus.campus.clone(),
            "Subtotal".to_string(),
            campus.subtotal.to_string(),
            loans.to_string(),
        ])?;
    }

    let total_loans: u32 = rollup
        .campuses
        .iter()
        .flat_map(|c| c.borrowers.iter())
        .map(|b| b.loans)
        .sum();
    wtr.write_record([
        "Total".to_string(),
        String::new(),
        rollup.total.to_string(),
        total_loans.to_string(),
    ])?;

    wtr.flush()?;
    Ok(path)
}

/// The filtered view under the source column names.
fn write_filtered_loans(output_dir: &Path, loans: &[LoanRecord]) -> Result<PathBuf> {
    let path = output_dir.join(FILTERED_LOANS_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([
        "#",
        "Fecha",
        "Nombre y Apellido",
        "Principal",
        "Comisión",
        "Interes",
        "Cuota",
        "Cheque",
        "Campus",
        "Estado",
        "Cod",
        "Fecha de Inicio",
        "Fecha de Finalización",
    ])?;

    for loan in loans {
        let extras = &loan.extras;
        wtr.write_record([
            extras.number.clone().unwrap_or_default(),
            date_cell(loan.date),
            loan.borrower.clone(),
            amount_cell(loan.principal),
            amount_cell(loan.commission),
            amount_cell(loan.interest),
            amount_cell(loan.installment),
            extras.cheque.clone().unwrap_or_default(),
            loan.campus.clone(),
            loan.status.clone(),
            extras.code.clone().unwrap_or_default(),
            date_cell(extras.start_date),
            date_cell(extras.end_date),
        ])?;
    }

    wtr.flush()?;
    Ok(path)
}

/// Missing values export as empty cells.
fn amount_cell(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn date_cell(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
