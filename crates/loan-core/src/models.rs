use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status tag for a loan whose installment is still owed.
pub const STATUS_PENDING: &str = "Pendiente";
/// Status tag for a loan that has been settled.
pub const STATUS_CANCELLED: &str = "Cancelado";

/// Treat a missing amount as zero for summation.
pub fn amount_or_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}

/// A single loan row read from the source table.
///
/// Records are never mutated after loading; every derived figure is built
/// into a new structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    /// Loan date (`Fecha`), absent when the cell could not be parsed.
    pub date: Option<NaiveDate>,
    /// Borrower full name (`Nombre y Apellido`).
    pub borrower: String,
    /// Branch the loan belongs to.
    pub campus: String,
    /// Lifecycle tag (`Estado`), e.g. [`STATUS_PENDING`].
    pub status: String,
    /// Amount disbursed.
    pub principal: Option<Decimal>,
    /// Interest portion of the repayment.
    pub interest: Option<Decimal>,
    /// Fee portion of the repayment (`Comisión`).
    pub commission: Option<Decimal>,
    /// Amount currently due (`Cuota`).
    pub installment: Option<Decimal>,
    /// Pass-through columns the pipeline tolerates but never aggregates.
    #[serde(default)]
    pub extras: LoanExtras,
}

impl LoanRecord {
    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }

    /// `(year, month)` of the loan date, or `None` when undated.
    pub fn year_month(&self) -> Option<(i32, u32)> {
        self.date.map(|d| (d.year(), d.month()))
    }
}

/// Optional columns carried through to the raw grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanExtras {
    /// Row number column (`#`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheque: Option<String>,
    /// Internal loan code (`Cod`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// `Fecha de Inicio`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// `Fecha de Finalización`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

// ── FilterSelection ───────────────────────────────────────────────────────────

/// The statuses and campuses a user chose for one run.
///
/// Membership on both axes is required. An empty set on either axis
/// matches nothing; it is not "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub statuses: BTreeSet<String>,
    pub campuses: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new<S, C>(statuses: S, campuses: C) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            statuses: statuses.into_iter().map(Into::into).collect(),
            campuses: campuses.into_iter().map(Into::into).collect(),
        }
    }

    /// Every distinct status and campus present in `records`.
    pub fn observed(records: &[LoanRecord]) -> Self {
        Self {
            statuses: records.iter().map(|r| r.status.clone()).collect(),
            campuses: records.iter().map(|r| r.campus.clone()).collect(),
        }
    }

    /// Whether `record` passes both axes.
    pub fn matches(&self, record: &LoanRecord) -> bool {
        self.statuses.contains(&record.status) && self.campuses.contains(&record.campus)
    }
}

// ── GainTotals ────────────────────────────────────────────────────────────────

/// Interest and commission accumulated over a group of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GainTotals {
    pub interest: Decimal,
    pub commission: Decimal,
    pub loans: u32,
}

impl GainTotals {
    /// Add a single record's amounts to the running totals.
    pub fn add_record(&mut self, record: &LoanRecord) {
        self.interest += amount_or_zero(record.interest);
        self.commission += amount_or_zero(record.commission);
        self.loans += 1;
    }

    pub fn total_gain(&self) -> Decimal {
        self.interest + self.commission
    }
}

// ── Buckets ───────────────────────────────────────────────────────────────────

/// Gain figures for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    /// Month number, 1 = January.
    pub month: u32,
    /// Localised month name, e.g. `"Enero"`.
    pub label: String,
    /// Month name and year, e.g. `"Enero 2025"`. Unique per bucket.
    pub display_label: String,
    pub interest: Decimal,
    pub commission: Decimal,
    pub total_gain: Decimal,
    pub loans: u32,
}

/// Gain figures for one campus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusBucket {
    pub campus: String,
    pub interest: Decimal,
    pub commission: Decimal,
    pub total_gain: Decimal,
    /// Share of the overall gain in percent, rounded to two places.
    pub share_pct: Decimal,
    pub loans: u32,
}

// ── Pending rollup ────────────────────────────────────────────────────────────

/// Installments owed by a single borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerRollup {
    pub borrower: String,
    pub installments: Decimal,
    pub loans: u32,
}

/// Installments owed within a campus, broken down by borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusRollup {
    pub campus: String,
    pub borrowers: Vec<BorrowerRollup>,
    pub subtotal: Decimal,
}

/// Campus → borrower → installment sum over pending loans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingRollup {
    pub campuses: Vec<CampusRollup>,
    pub total: Decimal,
}

// ── Scalar summary ────────────────────────────────────────────────────────────

/// Bookkeeping figures maintained by hand outside the loan table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessParams {
    /// Capital the operation started with.
    pub initial_capital: Decimal,
    /// Gains already paid out to the partner.
    pub distributed: Decimal,
    /// Card title for the cash position figure.
    pub cash_holder: String,
    /// Card title for the distributed figure.
    pub distribution_recipient: String,
}

impl Default for BusinessParams {
    fn default() -> Self {
        Self {
            initial_capital: Decimal::ZERO,
            distributed: Decimal::ZERO,
            cash_holder: "Efectivo".to_string(),
            distribution_recipient: "Ganancias Entregadas".to_string(),
        }
    }
}

/// Whole-of-view totals plus the derived cash position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarSummary {
    /// Sum of principal over the filtered view.
    pub total_principal: Decimal,
    /// Sum of interest over the filtered view.
    pub total_interest: Decimal,
    /// Sum of commission over the filtered view.
    pub total_commission: Decimal,
    /// `total_interest + total_commission`.
    pub total_gain: Decimal,
    /// Installments of cancelled loans over the whole table.
    pub cancelled_installments: Decimal,
    /// Installments of pending loans over the whole table.
    pub pending_installments: Decimal,
    pub initial_capital: Decimal,
    pub distributed: Decimal,
    /// `cancelled_installments + initial_capital - total_principal - distributed`.
    pub cash_position: Decimal,
}
