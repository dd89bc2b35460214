//! Presentation descriptors for the external dashboard renderer.
//!
//! Everything here is plain data: which figure each metric card shows, how
//! the detail and pivot grids are configured, and how statuses are colored.
//! The aggregation code never reads any of it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{BusinessParams, ScalarSummary, STATUS_CANCELLED, STATUS_PENDING};

/// Rows per page in the detail grid.
pub const DETAIL_PAGE_SIZE: u32 = 20;

// ── Metric cards ──────────────────────────────────────────────────────────────

/// A figure from [`ScalarSummary`] that a card can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryFigure {
    TotalPrincipal,
    TotalCommission,
    TotalInterest,
    TotalGain,
    CashPosition,
    PendingInstallments,
    InitialCapital,
    Distributed,
}

impl SummaryFigure {
    pub fn resolve(self, summary: &ScalarSummary) -> Decimal {
        match self {
            SummaryFigure::TotalPrincipal => summary.total_principal,
            SummaryFigure::TotalCommission => summary.total_commission,
            SummaryFigure::TotalInterest => summary.total_interest,
            SummaryFigure::TotalGain => summary.total_gain,
            SummaryFigure::CashPosition => summary.cash_position,
            SummaryFigure::PendingInstallments => summary.pending_installments,
            SummaryFigure::InitialCapital => summary.initial_capital,
            SummaryFigure::Distributed => summary.distributed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSpec {
    pub title: String,
    pub figure: SummaryFigure,
    /// Hex color for the figure text.
    pub accent: String,
}

impl CardSpec {
    fn new(title: impl Into<String>, figure: SummaryFigure, accent: &str) -> Self {
        Self {
            title: title.into(),
            figure,
            accent: accent.to_string(),
        }
    }
}

/// The four cards summarising the filtered view.
pub fn general_cards() -> Vec<CardSpec> {
    vec![
        CardSpec::new("Total Prestado", SummaryFigure::TotalPrincipal, "#2E86C1"),
        CardSpec::new("Total Comisión", SummaryFigure::TotalCommission, "#27AE60"),
        CardSpec::new("Total Interés", SummaryFigure::TotalInterest, "#E67E22"),
        CardSpec::new("Ganancias Totales", SummaryFigure::TotalGain, "#8E44AD"),
    ]
}

/// The four cash-management cards. Two titles name stakeholders and come
/// from `params`.
pub fn operational_cards(params: &BusinessParams) -> Vec<CardSpec> {
    vec![
        CardSpec::new(&params.cash_holder, SummaryFigure::CashPosition, "#2E86C1"),
        CardSpec::new("Por Recuperar", SummaryFigure::PendingInstallments, "#27AE60"),
        CardSpec::new("Capital", SummaryFigure::InitialCapital, "#E67E22"),
        CardSpec::new(
            &params.distribution_recipient,
            SummaryFigure::Distributed,
            "#8E44AD",
        ),
    ]
}

// ── Grids ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridColumn {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub pinned_left: bool,
    /// Position in the row-grouping hierarchy, outermost first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_group_index: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

impl GridColumn {
    fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            width: None,
            hidden: false,
            pinned_left: false,
            row_group_index: None,
            aggregation: None,
        }
    }

    fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    fn grouped(mut self, index: u8) -> Self {
        self.row_group_index = Some(index);
        self.pinned_left = true;
        self
    }

    fn summed(mut self) -> Self {
        self.aggregation = Some(Aggregation::Sum);
        self
    }
}

/// Row background for a given status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusStyle {
    pub status: String,
    pub background: String,
}

/// Text-equality filter applied when the grid first loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub field: String,
    pub equals: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub columns: Vec<GridColumn>,
    pub sortable: bool,
    pub filterable: bool,
    pub resizable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_filter: Option<ColumnFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status_styles: Vec<StatusStyle>,
}

/// Paginated grid over the filtered loans.
pub fn detail_grid() -> GridConfig {
    GridConfig {
        columns: vec![
            GridColumn::new("#").width(200),
            GridColumn::new("Fecha"),
            GridColumn::new("Nombre y Apellido").width(750),
            GridColumn::new("Principal").width(200),
            GridColumn::new("Comisión").width(200),
            GridColumn::new("Interes").width(200),
            GridColumn::new("Cuota").width(200),
            GridColumn::new("Cheque").width(200).hidden(),
            GridColumn::new("Campus").width(200),
            GridColumn::new("Estado").width(200),
            GridColumn::new("Cod").width(200),
            GridColumn::new("Fecha de Inicio").hidden(),
            GridColumn::new("Fecha de Finalización").hidden(),
        ],
        sortable: true,
        filterable: true,
        resizable: true,
        page_size: Some(DETAIL_PAGE_SIZE),
        date_format: Some("yyyy-MM-dd".to_string()),
        default_filter: Some(ColumnFilter {
            field: "Estado".to_string(),
            equals: STATUS_PENDING.to_string(),
        }),
        status_styles: vec![
            StatusStyle {
                status: STATUS_PENDING.to_string(),
                background: "#FDEBD0".to_string(),
            },
            StatusStyle {
                status: STATUS_CANCELLED.to_string(),
                background: "#D5F5E3".to_string(),
            },
        ],
    }
}

/// Campus → borrower grouping of pending installments.
pub fn pivot_grid() -> GridConfig {
    GridConfig {
        columns: vec![
            GridColumn::new("Campus").grouped(0),
            GridColumn::new("Nombre y Apellido").grouped(1),
            GridColumn::new("Cuota").summed(),
            GridColumn::new("Estado").hidden(),
            GridColumn::new("Fecha").hidden(),
            GridColumn::new("Principal").hidden(),
            GridColumn::new("Interes").hidden(),
            GridColumn::new("Comisión").hidden(),
        ],
        sortable: true,
        filterable: true,
        resizable: true,
        page_size: None,
        date_format: None,
        default_filter: None,
        status_styles: Vec::new(),
    }
}

/// Complete set of descriptors shipped alongside a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardLayout {
    pub general_cards: Vec<CardSpec>,
    pub operational_cards: Vec<CardSpec>,
    pub detail_grid: GridConfig,
    pub pivot_grid: GridConfig,
}

impl DashboardLayout {
    pub fn new(params: &BusinessParams) -> Self {
        Self {
            general_cards: general_cards(),
            operational_cards: operational_cards(params),
            detail_grid: detail_grid(),
            pivot_grid: pivot_grid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_card_titles_come_from_params() {
        let params = BusinessParams {
            cash_holder: "Caja".to_string(),
            distribution_recipient: "Socio".to_string(),
            ..BusinessParams::default()
        };
        let cards = operational_cards(&params);
        assert_eq!(cards[0].title, "Caja");
        assert_eq!(cards[3].title, "Socio");
        assert_eq!(cards.len(), 4);
    }

    #[test]
    fn test_summary_figure_resolves() {
        let summary = ScalarSummary {
            total_principal: dec!(3000),
            cash_position: dec!(-100),
            ..ScalarSummary::default()
        };
        assert_eq!(SummaryFigure::TotalPrincipal.resolve(&summary), dec!(3000));
        assert_eq!(SummaryFigure::CashPosition.resolve(&summary), dec!(-100));
        assert_eq!(SummaryFigure::TotalGain.resolve(&summary), dec!(0));
    }

    #[test]
    fn test_detail_grid_defaults() {
        let grid = detail_grid();
        assert_eq!(grid.page_size, Some(DETAIL_PAGE_SIZE));
        assert_eq!(grid.status_styles.len(), 2);
        let cheque = grid.columns.iter().find(|c| c.field == "Cheque").unwrap();
        assert!(cheque.hidden);
        let filter = grid.default_filter.unwrap();
        assert_eq!(filter.equals, STATUS_PENDING);
    }

    #[test]
    fn test_pivot_grid_groups_campus_then_borrower() {
        let grid = pivot_grid();
        let mut groups: Vec<(&str, u8)> = grid
            .columns
            .iter()
            .filter_map(|c| c.row_group_index.map(|i| (c.field.as_str(), i)))
            .collect();
        groups.sort_by_key(|(_, i)| *i);
        assert_eq!(groups, vec![("Campus", 0), ("Nombre y Apellido", 1)]);
        let cuota = grid.columns.iter().find(|c| c.field == "Cuota").unwrap();
        assert_eq!(cuota.aggregation, Some(Aggregation::Sum));
    }

    #[test]
    fn test_layout_serializes_snake_case_figures() {
        let layout = DashboardLayout::new(&BusinessParams::default());
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["general_cards"][0]["figure"], "total_principal");
        assert_eq!(json["pivot_grid"]["columns"][2]["aggregation"], "sum");
    }
}
