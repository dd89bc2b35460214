//! Cell coercion rules shared by every tabular source.
//!
//! Readers translate their native cell type into [`CellValue`]; the
//! processors here turn those into dates, amounts and text. None of them
//! fail: a cell that does not fit becomes `None`.

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

/// Source-independent view of one spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

// ── DateProcessor ─────────────────────────────────────────────────────────────

/// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Parses loan dates from native dates, Excel serials and text.
pub struct DateProcessor;

impl DateProcessor {
    /// Attempt to read `cell` as a calendar date.
    ///
    /// Handles:
    /// * native date-time cells → their date part
    /// * numbers in `1..=2958465` → Excel serial day numbers
    /// * text → ISO dates (with or without time), then day-first
    ///   `dd/mm/yyyy` and `dd-mm-yyyy`, then `yyyy/mm/dd`
    pub fn parse(cell: &CellValue) -> Option<NaiveDate> {
        match cell {
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Int(n) => Self::from_excel_serial(*n as f64),
            CellValue::Number(f) => Self::from_excel_serial(*f),
            CellValue::Text(s) => Self::parse_str(s.trim()),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
        if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
    }

    fn parse_str(s: &str) -> Option<NaiveDate> {
        if s.is_empty() {
            return None;
        }

        const DATETIME_FORMATS: &[&str] = &[
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M",
            "%d/%m/%Y %H:%M:%S",
            "%d/%m/%Y %H:%M",
        ];
        const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date);
            }
        }

        debug!("DateProcessor: could not parse date \"{}\"", s);
        None
    }
}

// ── AmountProcessor ───────────────────────────────────────────────────────────

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([+-]?\$?|\$[+-])\s*(\d{1,3}(,\d{3})+|\d*)(\.\d+)?$").expect("regex is valid")
    })
}

/// Largest magnitude accepted for a single amount cell (10^15).
///
/// Sums of bounded cells stay far below the range of [`Decimal`], so the
/// aggregations can add them without overflow checks.
pub const MAX_AMOUNT_MAGNITUDE: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Parses monetary cells into [`Decimal`].
pub struct AmountProcessor;

impl AmountProcessor {
    /// Attempt to read `cell` as an amount.
    ///
    /// Text may carry a leading `$` (with the sign on either side of it),
    /// comma thousands separators and surrounding whitespace. Non-finite
    /// numbers, booleans, dates and values beyond
    /// [`MAX_AMOUNT_MAGNITUDE`] are rejected.
    pub fn parse(cell: &CellValue) -> Option<Decimal> {
        let value = match cell {
            CellValue::Int(n) => Some(Decimal::from(*n)),
            CellValue::Number(f) => Self::from_f64(*f),
            CellValue::Text(s) => Self::parse_str(s.trim()),
            CellValue::Empty | CellValue::Bool(_) | CellValue::DateTime(_) => None,
        }?;
        Self::bounded(value)
    }

    /// `value` if its magnitude is within [`MAX_AMOUNT_MAGNITUDE`].
    pub fn bounded(value: Decimal) -> Option<Decimal> {
        if value.abs() > MAX_AMOUNT_MAGNITUDE {
            debug!("AmountProcessor: amount {} out of range", value);
            return None;
        }
        Some(value)
    }

    fn from_f64(value: f64) -> Option<Decimal> {
        if !value.is_finite() {
            return None;
        }
        // Display gives the shortest round-trip form, so 0.1 stays 0.1.
        Decimal::from_str(&value.to_string()).ok()
    }

    fn parse_str(s: &str) -> Option<Decimal> {
        if s.is_empty() || !s.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        if !amount_pattern().is_match(s) {
            debug!("AmountProcessor: rejected amount \"{}\"", s);
            return None;
        }
        let cleaned: String = s
            .chars()
            .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
            .collect();
        Decimal::from_str(&cleaned).ok()
    }
}

// ── TextProcessor ─────────────────────────────────────────────────────────────

/// Renders cells as canonical text for the categorical columns.
pub struct TextProcessor;

impl TextProcessor {
    /// Text form of `cell`. Integral numbers drop their fractional part so
    /// that a campus stored as `3.0` reads `"3"`.
    pub fn to_text(cell: &CellValue) -> String {
        match cell {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Number(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }

    /// Like [`to_text`](Self::to_text) but `None` for blank cells.
    pub fn to_optional_text(cell: &CellValue) -> Option<String> {
        let text = Self::to_text(cell);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
