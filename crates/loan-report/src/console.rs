//! Plain-text console summary.
//!
//! Renders the metric cards and the bucket tables as aligned columns. Column
//! widths are measured in display cells so accented labels line up.

use loan_core::formatting::{format_currency, format_number};
use loan_data::analysis::{CardValue, DashboardReport};
use unicode_width::UnicodeWidthStr;

const RULE_WIDTH: usize = 60;

/// Print [`render_text`] to stdout.
pub fn print_report(report: &DashboardReport) {
    print!("{}", render_text(report));
}

/// Render the whole report as text.
pub fn render_text(report: &DashboardReport) -> String {
    let mut out = String::new();

    let rule = "=".repeat(RULE_WIDTH);
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!("{}\n", centered("RESUMEN DE PRÉSTAMOS", RULE_WIDTH)));
    out.push_str(&format!("{}\n\n", rule));

    out.push_str(&format!(
        "Estado: {}\n",
        join_or_none(report.filters.statuses.iter())
    ));
    out.push_str(&format!(
        "Campus: {}\n",
        join_or_none(report.filters.campuses.iter())
    ));
    out.push_str(&format!(
        "Préstamos: {} de {}\n\n",
        report.metadata.records_selected, report.metadata.records_loaded
    ));

    section(&mut out, "Indicadores generales");
    render_cards(&mut out, &report.cards.general);
    out.push('\n');

    section(&mut out, "Indicadores de caja");
    render_cards(&mut out, &report.cards.operational);
    out.push('\n');

    section(&mut out, "Ganancias por mes");
    if report.chart_months.is_empty() {
        out.push_str("  (sin datos)\n");
    } else {
        let mut table = TextTable::new(&["Mes", "Interés", "Comisión", "Ganancias"]);
        for bucket in &report.chart_months {
            table.push(vec![
                bucket.display_label.clone(),
                format_number(bucket.interest, 2),
                format_number(bucket.commission, 2),
                format_number(bucket.total_gain, 2),
            ]);
        }
        table.render(&mut out);
    }
    out.push('\n');

    section(&mut out, "Ganancias por campus");
    if report.campuses.is_empty() {
        out.push_str("  (sin datos)\n");
    } else {
        let mut table = TextTable::new(&["Campus", "Interés", "Comisión", "Ganancias", "%"]);
        for bucket in &report.campuses {
            table.push(vec![
                bucket.campus.clone(),
                format_number(bucket.interest, 2),
                format_number(bucket.commission, 2),
                format_number(bucket.total_gain, 2),
                format_number(bucket.share_pct, 2),
            ]);
        }
        table.render(&mut out);
    }
    out.push('\n');

    section(&mut out, "Cuotas pendientes");
    if report.pending_rollup.campuses.is_empty() {
        out.push_str("  (sin datos)\n");
    } else {
        let mut table = TextTable::new(&["Campus / Nombre y Apellido", "Cuota"]);
        for campus in &report.pending_rollup.campuses {
            table.push(vec![
                campus.campus.clone(),
                format_number(campus.subtotal, 2),
            ]);
            for borrower in &campus.borrowers {
                table.push(vec![
                    format!("  {}", borrower.borrower),
                    format_number(borrower.installments, 2),
                ]);
            }
        }
        table.push(vec![
            "Total".to_string(),
            format_number(report.pending_rollup.total, 2),
        ]);
        table.render(&mut out);
    }

    out
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("{}\n", title));
    out.push_str(&format!("{}\n", "-".repeat(title.width())));
}

fn render_cards(out: &mut String, cards: &[CardValue]) {
    let label_width = cards.iter().map(|c| c.title.width()).max().unwrap_or(0);
    for card in cards {
        out.push_str(&format!(
            "  {}  {}\n",
            pad(&card.title, label_width, false),
            format_currency(card.value)
        ));
    }
}

fn join_or_none<'a>(values: impl Iterator<Item = &'a String>) -> String {
    let joined: Vec<&str> = values.map(String::as_str).collect();
    if joined.is_empty() {
        "(ninguno)".to_string()
    } else {
        joined.join(", ")
    }
}

fn centered(text: &str, width: usize) -> String {
    let left = width.saturating_sub(text.width()) / 2;
    format!("{}{}", " ".repeat(left), text)
}

fn pad(text: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    if right_align {
        format!("{}{}", fill, text)
    } else {
        format!("{}{}", text, fill)
    }
}

/// Column-aligned table. The first column is left-aligned, the rest are
/// right-aligned figures.
struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.width());
                }
            }
        }
        widths
    }

    fn render(&self, out: &mut String) {
        let widths = self.widths();
        let line = |cells: &[String]| -> String {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, w))| pad(cell, *w, i > 0))
                .collect();
            format!("  {}\n", padded.join("  "))
        };
        out.push_str(&line(&self.headers));
        for row in &self.rows {
            out.push_str(&line(row));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use loan_core::models::{BusinessParams, FilterSelection, LoanExtras, LoanRecord};
    use loan_data::analysis::{build_report, DashboardRequest};
    use rust_decimal_macros::dec;

    fn sample_report() -> DashboardReport {
        let records = vec![
            LoanRecord {
                date: NaiveDate::from_ymd_opt(2025, 1, 15),
                borrower: "Ana Pérez".to_string(),
                campus: "A".to_string(),
                status: "Pendiente".to_string(),
                principal: Some(dec!(1000)),
                interest: Some(dec!(100)),
                commission: Some(dec!(50)),
                installment: Some(dec!(200)),
                extras: LoanExtras::default(),
            },
            LoanRecord {
                date: NaiveDate::from_ymd_opt(2025, 2, 10),
                borrower: "Beto Ruiz".to_string(),
                campus: "B".to_string(),
                status: "Cancelado".to_string(),
                principal: Some(dec!(2000)),
                interest: Some(dec!(150)),
                commission: Some(dec!(0)),
                installment: Some(dec!(500)),
                extras: LoanExtras::default(),
            },
        ];
        let request = DashboardRequest {
            selection: FilterSelection::observed(&records),
            params: BusinessParams {
                initial_capital: dec!(9000),
                distributed: dec!(3000),
                ..BusinessParams::default()
            },
            ..DashboardRequest::default()
        };
        build_report(&records, &request)
    }

    #[test]
    fn test_render_text_contains_cards_and_buckets() {
        let text = render_text(&sample_report());

        assert!(text.contains("RESUMEN DE PRÉSTAMOS"));
        assert!(text.contains("Total Prestado"));
        assert!(text.contains("$3,000.00"));
        assert!(text.contains("Enero 2025"));
        assert!(text.contains("Febrero 2025"));
        assert!(text.contains("Préstamos: 2 de 2"));
        assert!(text.contains("  Ana Pérez"));
    }

    #[test]
    fn test_render_text_months_in_order() {
        let text = render_text(&sample_report());
        let jan = text.find("Enero 2025").unwrap();
        let feb = text.find("Febrero 2025").unwrap();
        assert!(jan < feb);
    }

    #[test]
    fn test_render_text_empty_view() {
        let mut report = sample_report();
        report.chart_months.clear();
        report.campuses.clear();
        let text = render_text(&report);
        assert!(text.matches("(sin datos)").count() >= 2);
    }

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(pad("Comisión", 10, false), "Comisión  ");
        assert_eq!(pad("1.00", 6, true), "  1.00");
        assert_eq!(pad("toolong", 3, true), "toolong");
    }

    #[test]
    fn test_table_columns_align() {
        let mut table = TextTable::new(&["Mes", "Total"]);
        table.push(vec!["Enero 2025".to_string(), "1.00".to_string()]);
        table.push(vec!["Mayo 2025".to_string(), "100.00".to_string()]);
        let mut out = String::new();
        table.render(&mut out);

        let widths: Vec<usize> = out.lines().map(|l| l.width()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }
}
