//! Status/campus filtering of the loan table.

use std::collections::BTreeSet;

use loan_core::models::{FilterSelection, LoanRecord};
use tracing::warn;

/// The loans that passed a [`FilterSelection`], in source order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    records: Vec<&'a LoanRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a LoanRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Owned copies for output.
    pub fn to_records(&self) -> Vec<LoanRecord> {
        self.records.iter().map(|r| (*r).clone()).collect()
    }
}

/// Keep the records whose status and campus are both selected.
pub fn apply_filter<'a>(records: &'a [LoanRecord], selection: &FilterSelection) -> FilteredView<'a> {
    FilteredView {
        records: records.iter().filter(|r| selection.matches(r)).collect(),
    }
}

/// Build the selection for a run from the values the user asked for.
///
/// An axis given as `None` selects everything observed in `records` on that
/// axis; `Some` selects exactly the listed values, so `Some(&[])` selects
/// nothing. Requested values that never occur are kept (they simply match
/// nothing) and reported at warn level.
pub fn resolve_selection(
    records: &[LoanRecord],
    statuses: Option<&[String]>,
    campuses: Option<&[String]>,
) -> FilterSelection {
    let observed = FilterSelection::observed(records);

    let statuses = resolve_axis("status", statuses, observed.statuses);
    let campuses = resolve_axis("campus", campuses, observed.campuses);

    FilterSelection { statuses, campuses }
}

fn resolve_axis(
    axis: &str,
    requested: Option<&[String]>,
    observed: BTreeSet<String>,
) -> BTreeSet<String> {
    let Some(requested) = requested else {
        return observed;
    };
    for value in requested {
        if !observed.contains(value) {
            warn!("No loans with {} \"{}\" in the source", axis, value);
        }
    }
    requested.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use loan_core::models::LoanExtras;
    use rust_decimal_macros::dec;

    fn record(borrower: &str, status: &str, campus: &str) -> LoanRecord {
        LoanRecord {
            date: NaiveDate::from_ymd_opt(2025, 1, 15),
            borrower: borrower.to_string(),
            campus: campus.to_string(),
            status: status.to_string(),
            principal: Some(dec!(100)),
            interest: Some(dec!(10)),
            commission: Some(dec!(5)),
            installment: Some(dec!(20)),
            extras: LoanExtras::default(),
        }
    }

    fn table() -> Vec<LoanRecord> {
        vec![
            record("r1", "Pendiente", "A"),
            record("r2", "Cancelado", "A"),
            record("r3", "Pendiente", "B"),
            record("r4", "Cancelado", "C"),
            record("r5", "Pendiente", "A"),
        ]
    }

    fn names(view: &FilteredView) -> Vec<String> {
        view.iter().map(|r| r.borrower.clone()).collect()
    }

    #[test]
    fn test_default_selection_keeps_everything() {
        let records = table();
        let selection = resolve_selection(&records, None, None);
        let view = apply_filter(&records, &selection);
        assert_eq!(view.len(), records.len());
    }

    #[test]
    fn test_filter_is_logical_and_and_keeps_order() {
        let records = table();
        let selection = FilterSelection::new(["Pendiente"], ["A", "B"]);
        let view = apply_filter(&records, &selection);
        assert_eq!(names(&view), vec!["r1", "r3", "r5"]);
    }

    #[test]
    fn test_every_filtered_record_satisfies_selection() {
        let records = table();
        let selection = FilterSelection::new(["Cancelado"], ["A", "C"]);
        let view = apply_filter(&records, &selection);
        assert!(!view.is_empty());
        for r in view.iter() {
            assert!(selection.statuses.contains(&r.status));
            assert!(selection.campuses.contains(&r.campus));
        }
    }

    #[test]
    fn test_empty_axis_yields_empty_view() {
        let records = table();
        let no_status = FilterSelection::new(Vec::<String>::new(), ["A", "B", "C"]);
        assert!(apply_filter(&records, &no_status).is_empty());

        let no_campus = FilterSelection::new(["Pendiente", "Cancelado"], Vec::<String>::new());
        assert!(apply_filter(&records, &no_campus).is_empty());
    }

    #[test]
    fn test_membership_not_pattern_match() {
        let records = table();
        let selection = FilterSelection::new(["Pend"], ["A"]);
        assert!(apply_filter(&records, &selection).is_empty());
    }

    #[test]
    fn test_resolve_selection_honours_requested_axis_only() {
        let records = table();
        let selection = resolve_selection(&records, Some(&["Cancelado".to_string()][..]), None);
        assert_eq!(selection.statuses.len(), 1);
        assert_eq!(selection.campuses.len(), 3);
    }

    #[test]
    fn test_resolve_selection_keeps_unknown_values() {
        let records = table();
        let selection = resolve_selection(&records, None, Some(&["Z".to_string()][..]));
        assert!(selection.campuses.contains("Z"));
        assert!(apply_filter(&records, &selection).is_empty());
    }

    #[test]
    fn test_resolve_selection_explicit_empty_axis_selects_nothing() {
        let records = table();
        let selection = resolve_selection(&records, Some(&[]), None);
        assert!(selection.statuses.is_empty());
        assert_eq!(selection.campuses.len(), 3);
        assert!(apply_filter(&records, &selection).is_empty());
    }

    #[test]
    fn test_to_records_clones_in_order() {
        let records = table();
        let selection = FilterSelection::new(["Cancelado"], ["A", "B", "C"]);
        let owned = apply_filter(&records, &selection).to_records();
        assert_eq!(owned, vec![records[1].clone(), records[3].clone()]);
    }
}
