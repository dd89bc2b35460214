//! Main reporting pipeline.
//!
//! Filters the loan table, runs every aggregation and bundles the results
//! with the presentation descriptors into a [`DashboardReport`].

use std::path::Path;

use chrono::Utc;
use loan_core::layout::{CardSpec, DashboardLayout};
use loan_core::locale::MonthNames;
use loan_core::models::{
    BusinessParams, CampusBucket, FilterSelection, LoanRecord, MonthBucket, PendingRollup,
    ScalarSummary,
};
use loan_core::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::aggregator::LoanAggregator;
use crate::filter::{apply_filter, resolve_selection};
use crate::reader::load_loan_records;

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything a run needs besides the loan table itself.
#[derive(Debug, Clone, Default)]
pub struct DashboardRequest {
    pub selection: FilterSelection,
    pub params: BusinessParams,
    pub month_names: MonthNames,
    /// Restrict the chart months to this year.
    pub year: Option<i32>,
}

/// Run options as given on the command line, before the selection is
/// resolved against the loaded table.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Requested statuses; `None` selects every status present.
    pub statuses: Option<Vec<String>>,
    /// Requested campuses; `None` selects every campus present.
    pub campuses: Option<Vec<String>>,
    pub params: BusinessParams,
    pub month_names: MonthNames,
    pub year: Option<i32>,
}

/// Metadata about one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp, set only when the report came from a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Rows in the unfiltered table.
    pub records_loaded: usize,
    /// Rows that passed the filter.
    pub records_selected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_time_seconds: Option<f64>,
}

/// A metric card with its figure filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardValue {
    pub title: String,
    pub accent: String,
    pub value: Decimal,
}

impl CardValue {
    fn resolve(spec: &CardSpec, summary: &ScalarSummary) -> Self {
        Self {
            title: spec.title.clone(),
            accent: spec.accent.clone(),
            value: spec.figure.resolve(summary),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCards {
    pub general: Vec<CardValue>,
    pub operational: Vec<CardValue>,
}

/// The complete output of [`build_report`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub filters: FilterSelection,
    pub summary: ScalarSummary,
    pub cards: ReportCards,
    /// All month buckets of the filtered view.
    pub monthly: Vec<MonthBucket>,
    /// Month buckets after the optional year restriction.
    pub chart_months: Vec<MonthBucket>,
    pub available_years: Vec<i32>,
    pub campuses: Vec<CampusBucket>,
    /// The filtered view in source order.
    pub loans: Vec<LoanRecord>,
    /// Pending installments over the unfiltered table.
    pub pending_rollup: PendingRollup,
    pub layout: DashboardLayout,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Build the report for `records` without touching the clock or disk.
///
/// Calling this twice with equal inputs yields equal reports.
pub fn build_report(records: &[LoanRecord], request: &DashboardRequest) -> DashboardReport {
    let view = apply_filter(records, &request.selection);

    let summary = LoanAggregator::scalar_summary(view.iter(), records, &request.params);
    let monthly = LoanAggregator::monthly(view.iter(), &request.month_names);
    let available_years = LoanAggregator::available_years(&monthly);
    let chart_months = match request.year {
        Some(year) => LoanAggregator::restrict_to_year(&monthly, year),
        None => monthly.clone(),
    };
    let campuses = LoanAggregator::by_campus(view.iter());
    let pending_rollup = LoanAggregator::pending_rollup(records);

    let layout = DashboardLayout::new(&request.params);
    let cards = ReportCards {
        general: layout
            .general_cards
            .iter()
            .map(|c| CardValue::resolve(c, &summary))
            .collect(),
        operational: layout
            .operational_cards
            .iter()
            .map(|c| CardValue::resolve(c, &summary))
            .collect(),
    };

    DashboardReport {
        metadata: ReportMetadata {
            records_loaded: records.len(),
            records_selected: view.len(),
            ..ReportMetadata::default()
        },
        filters: request.selection.clone(),
        summary,
        cards,
        monthly,
        chart_months,
        available_years,
        campuses,
        loans: view.to_records(),
        pending_rollup,
        layout,
    }
}

/// Load `path`, resolve the selection, build the report and stamp it with
/// run metadata.
pub fn analyze_source(
    path: &Path,
    sheet: &str,
    options: &AnalysisOptions,
) -> Result<DashboardReport> {
    let load_start = std::time::Instant::now();
    let records = load_loan_records(path, sheet)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let request = DashboardRequest {
        selection: resolve_selection(
            &records,
            options.statuses.as_deref(),
            options.campuses.as_deref(),
        ),
        params: options.params.clone(),
        month_names: options.month_names.clone(),
        year: options.year,
    };

    let mut report = build_report(&records, &request);
    report.metadata.generated_at = Some(Utc::now().to_rfc3339());
    report.metadata.source = Some(path.display().to_string());
    report.metadata.load_time_seconds = Some(load_time);

    info!(
        "Report built: {} of {} loans selected, {} months, {} campuses",
        report.metadata.records_selected,
        report.metadata.records_loaded,
        report.monthly.len(),
        report.campuses.len()
    );

    Ok(report)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
