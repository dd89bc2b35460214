//! Loan aggregation: scalar totals, monthly and campus buckets, and the
//! pending-installment rollup.

use std::collections::BTreeMap;

use loan_core::formatting::percentage;
use loan_core::locale::MonthNames;
use loan_core::models::{
    amount_or_zero, BorrowerRollup, BusinessParams, CampusBucket, CampusRollup, GainTotals,
    LoanRecord, MonthBucket, PendingRollup, ScalarSummary, STATUS_CANCELLED, STATUS_PENDING,
};
use rust_decimal::Decimal;

/// Stateless helper that turns loan records into report figures.
pub struct LoanAggregator;

impl LoanAggregator {
    /// Totals over `view` plus the cash position.
    ///
    /// The installment sums are taken over the whole `table`, while the
    /// principal subtracted in the cash position is the filtered total.
    pub fn scalar_summary<'a>(
        view: impl IntoIterator<Item = &'a LoanRecord>,
        table: &[LoanRecord],
        params: &BusinessParams,
    ) -> ScalarSummary {
        let mut total_principal = Decimal::ZERO;
        let mut total_interest = Decimal::ZERO;
        let mut total_commission = Decimal::ZERO;
        for record in view {
            total_principal += amount_or_zero(record.principal);
            total_interest += amount_or_zero(record.interest);
            total_commission += amount_or_zero(record.commission);
        }

        let cancelled_installments = Self::installments_with_status(table, STATUS_CANCELLED);
        let pending_installments = Self::installments_with_status(table, STATUS_PENDING);

        ScalarSummary {
            total_principal,
            total_interest,
            total_commission,
            total_gain: total_interest + total_commission,
            cancelled_installments,
            pending_installments,
            initial_capital: params.initial_capital,
            distributed: params.distributed,
            cash_position: cancelled_installments + params.initial_capital
                - total_principal
                - params.distributed,
        }
    }

    /// Sum of installments for records whose status equals `status`.
    pub fn installments_with_status(table: &[LoanRecord], status: &str) -> Decimal {
        table
            .iter()
            .filter(|r| r.status == status)
            .map(|r| amount_or_zero(r.installment))
            .sum()
    }

    /// Group `view` by calendar month of the loan date.
    ///
    /// Undated records are left out. Buckets come back ordered by
    /// `(year, month)`.
    pub fn monthly<'a>(
        view: impl IntoIterator<Item = &'a LoanRecord>,
        names: &MonthNames,
    ) -> Vec<MonthBucket> {
        let mut map: BTreeMap<(i32, u32), GainTotals> = BTreeMap::new();

        for record in view {
            let Some(key) = record.year_month() else {
                continue;
            };
            map.entry(key).or_default().add_record(record);
        }

        map.into_iter()
            .map(|((year, month), totals)| {
                let label = names.label(month);
                MonthBucket {
                    year,
                    month,
                    display_label: format!("{} {}", label, year),
                    label,
                    total_gain: totals.total_gain(),
                    interest: totals.interest,
                    commission: totals.commission,
                    loans: totals.loans,
                }
            })
            .collect()
    }

    /// Buckets falling in `year`, order unchanged.
    pub fn restrict_to_year(buckets: &[MonthBucket], year: i32) -> Vec<MonthBucket> {
        buckets.iter().filter(|b| b.year == year).cloned().collect()
    }

    /// Distinct years present in `buckets`, ascending.
    pub fn available_years(buckets: &[MonthBucket]) -> Vec<i32> {
        let mut years: Vec<i32> = buckets.iter().map(|b| b.year).collect();
        years.dedup();
        years
    }

    /// Group `view` by campus, ordered by campus text.
    pub fn by_campus<'a>(view: impl IntoIterator<Item = &'a LoanRecord>) -> Vec<CampusBucket> {
        let mut map: BTreeMap<String, GainTotals> = BTreeMap::new();

        for record in view {
            map.entry(record.campus.clone())
                .or_default()
                .add_record(record);
        }

        let overall: Decimal = map.values().map(GainTotals::total_gain).sum();

        map.into_iter()
            .map(|(campus, totals)| {
                let total_gain = totals.total_gain();
                CampusBucket {
                    campus,
                    interest: totals.interest,
                    commission: totals.commission,
                    share_pct: percentage(total_gain, overall, 2),
                    total_gain,
                    loans: totals.loans,
                }
            })
            .collect()
    }

    /// Campus → borrower → installment sum over the pending loans of `table`.
    pub fn pending_rollup(table: &[LoanRecord]) -> PendingRollup {
        let mut map: BTreeMap<&str, BTreeMap<&str, (Decimal, u32)>> = BTreeMap::new();

        for record in table.iter().filter(|r| r.is_pending()) {
            let slot = map
                .entry(record.campus.as_str())
                .or_default()
                .entry(record.borrower.as_str())
                .or_default();
            slot.0 += amount_or_zero(record.installment);
            slot.1 += 1;
        }

        let campuses: Vec<CampusRollup> = map
            .into_iter()
            .map(|(campus, borrowers)| {
                let borrowers: Vec<BorrowerRollup> = borrowers
                    .into_iter()
                    .map(|(borrower, (installments, loans))| BorrowerRollup {
                        borrower: borrower.to_string(),
                        installments,
                        loans,
                    })
                    .collect();
                CampusRollup {
                    campus: campus.to_string(),
                    subtotal: borrowers.iter().map(|b| b.installments).sum(),
                    borrowers,
                }
            })
            .collect();

        PendingRollup {
            total: campuses.iter().map(|c| c.subtotal).sum(),
            campuses,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use loan_core::models::LoanExtras;
    use rust_decimal_macros::dec;

    fn make_record(
        date: Option<(i32, u32, u32)>,
        campus: &str,
        status: &str,
        principal: Option<Decimal>,
        interest: Option<Decimal>,
        commission: Option<Decimal>,
        installment: Option<Decimal>,
    ) -> LoanRecord {
        LoanRecord {
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            borrower: format!("{campus}-{status}"),
            campus: campus.to_string(),
            status: status.to_string(),
            principal,
            interest,
            commission,
            installment,
            extras: LoanExtras::default(),
        }
    }

    fn dated(y: i32, m: u32, interest: Decimal, commission: Decimal) -> LoanRecord {
        make_record(
            Some((y, m, 1)),
            "A",
            STATUS_PENDING,
            Some(dec!(100)),
            Some(interest),
            Some(commission),
            Some(dec!(10)),
        )
    }

    fn params(capital: Decimal, distributed: Decimal) -> BusinessParams {
        BusinessParams {
            initial_capital: capital,
            distributed,
            ..BusinessParams::default()
        }
    }

    // ── scalar_summary ────────────────────────────────────────────────────────

    #[test]
    fn test_scalar_summary_totals() {
        let table = vec![
            make_record(
                Some((2025, 1, 15)),
                "A",
                STATUS_PENDING,
                Some(dec!(1000)),
                Some(dec!(100)),
                Some(dec!(50)),
                Some(dec!(200)),
            ),
            make_record(
                Some((2025, 2, 10)),
                "B",
                STATUS_CANCELLED,
                Some(dec!(2000)),
                Some(dec!(150)),
                Some(dec!(0)),
                Some(dec!(500)),
            ),
        ];

        let s = LoanAggregator::scalar_summary(&table, &table, &params(dec!(9000), dec!(3000)));

        assert_eq!(s.total_principal, dec!(3000));
        assert_eq!(s.total_interest, dec!(250));
        assert_eq!(s.total_commission, dec!(50));
        assert_eq!(s.total_gain, dec!(300));
        assert_eq!(s.cancelled_installments, dec!(500));
        assert_eq!(s.pending_installments, dec!(200));
        // 500 + 9000 - 3000 - 3000
        assert_eq!(s.cash_position, dec!(3500));
    }

    #[test]
    fn test_cash_position_mixes_filtered_principal_with_full_table() {
        let table = vec![
            make_record(
                None,
                "A",
                STATUS_PENDING,
                Some(dec!(1000)),
                None,
                None,
                Some(dec!(200)),
            ),
            make_record(
                None,
                "B",
                STATUS_CANCELLED,
                Some(dec!(2000)),
                None,
                None,
                Some(dec!(500)),
            ),
        ];
        // View holds only the pending loan; cancelled sum still sees both.
        let view = vec![&table[0]];

        let s = LoanAggregator::scalar_summary(view, &table, &params(dec!(9000), dec!(0)));

        assert_eq!(s.total_principal, dec!(1000));
        assert_eq!(s.cancelled_installments, dec!(500));
        assert_eq!(s.cash_position, dec!(8500));
    }

    #[test]
    fn test_scalar_summary_empty_view_is_zero() {
        let table = vec![dated(2025, 1, dec!(10), dec!(5))];
        let s = LoanAggregator::scalar_summary(
            std::iter::empty(),
            &table,
            &BusinessParams::default(),
        );
        assert_eq!(s.total_principal, Decimal::ZERO);
        assert_eq!(s.total_gain, Decimal::ZERO);
        assert_eq!(s.pending_installments, dec!(10));
    }

    #[test]
    fn test_scalar_summary_missing_amounts_count_as_zero() {
        let table = vec![make_record(
            None,
            "A",
            STATUS_PENDING,
            None,
            Some(dec!(7)),
            None,
            None,
        )];
        let s = LoanAggregator::scalar_summary(&table, &table, &BusinessParams::default());
        assert_eq!(s.total_principal, dec!(0));
        assert_eq!(s.total_gain, dec!(7));
        assert_eq!(s.pending_installments, dec!(0));
    }

    // ── monthly ───────────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_groups_and_sums() {
        let table = vec![
            dated(2025, 1, dec!(100), dec!(50)),
            dated(2025, 1, dec!(20), dec!(5)),
            dated(2025, 2, dec!(150), dec!(0)),
        ];
        let buckets = LoanAggregator::monthly(&table, &MonthNames::spanish());

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].display_label, "Enero 2025");
        assert_eq!(buckets[0].interest, dec!(120));
        assert_eq!(buckets[0].commission, dec!(55));
        assert_eq!(buckets[0].total_gain, dec!(175));
        assert_eq!(buckets[0].loans, 2);
        assert_eq!(buckets[1].display_label, "Febrero 2025");
    }

    #[test]
    fn test_monthly_is_chronological_not_alphabetical() {
        let table = vec![
            dated(2026, 1, dec!(1), dec!(0)),
            dated(2025, 4, dec!(1), dec!(0)),
            dated(2025, 12, dec!(1), dec!(0)),
            dated(2025, 8, dec!(1), dec!(0)),
        ];
        let buckets = LoanAggregator::monthly(&table, &MonthNames::spanish());
        let labels: Vec<&str> = buckets.iter().map(|b| b.display_label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Abril 2025", "Agosto 2025", "Diciembre 2025", "Enero 2026"]
        );
    }

    #[test]
    fn test_monthly_same_month_different_years_are_distinct() {
        let table = vec![
            dated(2025, 3, dec!(1), dec!(0)),
            dated(2026, 3, dec!(2), dec!(0)),
        ];
        let buckets = LoanAggregator::monthly(&table, &MonthNames::english());
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].display_label, "March 2025");
        assert_eq!(buckets[1].display_label, "March 2026");
    }

    #[test]
    fn test_monthly_skips_undated_records() {
        let mut undated = dated(2025, 1, dec!(999), dec!(999));
        undated.date = None;
        let table = vec![dated(2025, 1, dec!(10), dec!(5)), undated];

        let buckets = LoanAggregator::monthly(&table, &MonthNames::spanish());
        let summary = LoanAggregator::scalar_summary(&table, &table, &BusinessParams::default());

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].total_gain, dec!(15));
        // The scalar totals still count the undated loan.
        assert_eq!(summary.total_gain, dec!(2013));
    }

    #[test]
    fn test_monthly_empty_view() {
        assert!(LoanAggregator::monthly(&[], &MonthNames::spanish()).is_empty());
    }

    #[test]
    fn test_restrict_to_year_and_available_years() {
        let table = vec![
            dated(2024, 11, dec!(1), dec!(0)),
            dated(2025, 1, dec!(1), dec!(0)),
            dated(2025, 2, dec!(1), dec!(0)),
        ];
        let buckets = LoanAggregator::monthly(&table, &MonthNames::spanish());

        assert_eq!(LoanAggregator::available_years(&buckets), vec![2024, 2025]);
        let only_2025 = LoanAggregator::restrict_to_year(&buckets, 2025);
        assert_eq!(only_2025.len(), 2);
        assert!(only_2025.iter().all(|b| b.year == 2025));
        assert!(LoanAggregator::restrict_to_year(&buckets, 2030).is_empty());
    }

    // ── by_campus ─────────────────────────────────────────────────────────────

    #[test]
    fn test_by_campus_groups_and_shares() {
        let mut b = dated(2025, 1, dec!(100), dec!(0));
        b.campus = "B".to_string();
        let table = vec![
            dated(2025, 1, dec!(100), dec!(50)),
            dated(2025, 2, dec!(50), dec!(0)),
            b,
        ];

        let buckets = LoanAggregator::by_campus(&table);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].campus, "A");
        assert_eq!(buckets[0].total_gain, dec!(200));
        assert_eq!(buckets[0].loans, 2);
        assert_eq!(buckets[1].campus, "B");
        assert_eq!(buckets[1].total_gain, dec!(100));
        assert_eq!(buckets[0].share_pct, dec!(66.67));
        assert_eq!(buckets[1].share_pct, dec!(33.33));
    }

    #[test]
    fn test_by_campus_zero_gain_has_zero_share() {
        let table = vec![dated(2025, 1, dec!(0), dec!(0))];
        let buckets = LoanAggregator::by_campus(&table);
        assert_eq!(buckets[0].share_pct, dec!(0));
    }

    #[test]
    fn test_gain_decomposition_holds_everywhere() {
        let table = vec![
            dated(2025, 1, dec!(10.10), dec!(0.05)),
            dated(2025, 2, dec!(0.1), dec!(0.2)),
        ];
        for b in LoanAggregator::monthly(&table, &MonthNames::spanish()) {
            assert_eq!(b.total_gain, b.interest + b.commission);
        }
        for b in LoanAggregator::by_campus(&table) {
            assert_eq!(b.total_gain, b.interest + b.commission);
        }
        let s = LoanAggregator::scalar_summary(&table, &table, &BusinessParams::default());
        assert_eq!(s.total_gain, dec!(10.45));
    }

    // ── pending_rollup ────────────────────────────────────────────────────────

    #[test]
    fn test_pending_rollup_groups_campus_then_borrower() {
        let mut ana_1 = dated(2025, 1, dec!(0), dec!(0));
        ana_1.borrower = "Ana".to_string();
        ana_1.installment = Some(dec!(200));
        let mut ana_2 = ana_1.clone();
        ana_2.installment = Some(dec!(50));
        let mut beto = ana_1.clone();
        beto.borrower = "Beto".to_string();
        beto.installment = None;
        let mut carla = ana_1.clone();
        carla.borrower = "Carla".to_string();
        carla.campus = "B".to_string();
        carla.installment = Some(dec!(75));
        let mut settled = ana_1.clone();
        settled.status = STATUS_CANCELLED.to_string();
        settled.installment = Some(dec!(1000));

        let table = vec![carla, ana_1, settled, beto, ana_2];
        let rollup = LoanAggregator::pending_rollup(&table);

        assert_eq!(rollup.campuses.len(), 2);
        let a = &rollup.campuses[0];
        assert_eq!(a.campus, "A");
        assert_eq!(a.borrowers.len(), 2);
        assert_eq!(a.borrowers[0].borrower, "Ana");
        assert_eq!(a.borrowers[0].installments, dec!(250));
        assert_eq!(a.borrowers[0].loans, 2);
        assert_eq!(a.borrowers[1].installments, dec!(0));
        assert_eq!(a.subtotal, dec!(250));
        assert_eq!(rollup.campuses[1].subtotal, dec!(75));
        assert_eq!(rollup.total, dec!(325));
        assert_eq!(
            rollup.total,
            LoanAggregator::installments_with_status(&table, STATUS_PENDING)
        );
    }

    #[test]
    fn test_pending_rollup_empty_table() {
        let rollup = LoanAggregator::pending_rollup(&[]);
        assert!(rollup.campuses.is_empty());
        assert_eq!(rollup.total, Decimal::ZERO);
    }
}
