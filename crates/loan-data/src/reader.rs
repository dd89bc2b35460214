//! Tabular source loading for the loan dashboard.
//!
//! Reads the loan sheet from a CSV file or a workbook and converts each row
//! into a [`LoanRecord`]. Structural problems (missing file, missing sheet,
//! missing column) abort the load; a bad cell only blanks that one field.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use loan_core::cells::{AmountProcessor, CellValue, DateProcessor, TextProcessor};
use loan_core::error::{LoanError, Result};
use loan_core::models::{LoanExtras, LoanRecord};
use tracing::{debug, info};

// ── Column contract ───────────────────────────────────────────────────────────

pub const COL_DATE: &str = "Fecha";
pub const COL_BORROWER: &str = "Nombre y Apellido";
pub const COL_CAMPUS: &str = "Campus";
pub const COL_STATUS: &str = "Estado";
pub const COL_PRINCIPAL: &str = "Principal";
pub const COL_INTEREST: &str = "Interes";
pub const COL_COMMISSION: &str = "Comisión";
pub const COL_INSTALLMENT: &str = "Cuota";

pub const COL_NUMBER: &str = "#";
pub const COL_CHEQUE: &str = "Cheque";
pub const COL_CODE: &str = "Cod";
pub const COL_START_DATE: &str = "Fecha de Inicio";
pub const COL_END_DATE: &str = "Fecha de Finalización";

/// Columns every source must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_DATE,
    COL_BORROWER,
    COL_CAMPUS,
    COL_STATUS,
    COL_PRINCIPAL,
    COL_INTEREST,
    COL_COMMISSION,
    COL_INSTALLMENT,
];

// ── Raw table ─────────────────────────────────────────────────────────────────

/// Header row plus untyped data rows, independent of the source format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// How a source file is decoded, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(SourceFormat::Csv),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(SourceFormat::Workbook),
            _ => Err(LoanError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and normalise every loan in `path`.
///
/// * `path` – a `.csv` file or a workbook.
/// * `sheet` – worksheet name; ignored for CSV.
pub fn load_loan_records(path: &Path, sheet: &str) -> Result<Vec<LoanRecord>> {
    let table = read_table(path, sheet)?;
    let records = normalize(&table)?;
    info!(
        "Loaded {} loan records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Read the header row and data rows of `path` without interpreting them.
pub fn read_table(path: &Path, sheet: &str) -> Result<RawTable> {
    let format = SourceFormat::detect(path)?;
    if !path.exists() {
        return Err(LoanError::SourceNotFound(path.to_path_buf()));
    }

    let table = match format {
        SourceFormat::Csv => read_csv(path)?,
        SourceFormat::Workbook => read_workbook(path, sheet)?,
    };

    if table.headers.iter().all(|h| h.is_empty()) {
        return Err(LoanError::EmptySource(path.to_path_buf()));
    }
    Ok(table)
}

/// Convert a raw table into loan records.
///
/// Fails only when a required column is absent. Fully blank rows are
/// skipped.
pub fn normalize(table: &RawTable) -> Result<Vec<LoanRecord>> {
    let columns = ColumnMap::resolve(&table.headers)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut blank_rows = 0usize;
    let mut degraded_cells = 0usize;

    for (idx, row) in table.rows.iter().enumerate() {
        if row.iter().all(CellValue::is_empty) {
            blank_rows += 1;
            continue;
        }
        // Header is line 1 in the source.
        let line = idx + 2;
        let (record, degraded) = columns.build_record(row, line);
        degraded_cells += degraded;
        records.push(record);
    }

    debug!(
        "Normalised {} rows: {} blank skipped, {} cells degraded to missing",
        records.len(),
        blank_rows,
        degraded_cells
    );

    Ok(records)
}

// ── Format readers ────────────────────────────────────────────────────────────

fn read_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|source| LoanError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader
        .headers()?
        .iter()
        .map(clean_header)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

fn read_workbook(path: &Path, sheet: &str) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).map_err(|e| LoanError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(LoanError::SheetNotFound(sheet.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| LoanError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|cell| clean_header(&TextProcessor::to_text(&data_to_cell(cell))))
                .collect()
        })
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

/// Translate a calamine cell into the source-independent [`CellValue`].
fn data_to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(n) => CellValue::Int(*n),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

// ── Column mapping ────────────────────────────────────────────────────────────

/// Header positions for the columns the pipeline reads.
struct ColumnMap {
    date: usize,
    borrower: usize,
    campus: usize,
    status: usize,
    principal: usize,
    interest: usize,
    commission: usize,
    installment: usize,
    number: Option<usize>,
    cheque: Option<usize>,
    code: Option<usize>,
    start_date: Option<usize>,
    end_date: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self> {
        // First occurrence wins when a header repeats.
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            index.entry(h.as_str()).or_insert(i);
        }

        let required = |name: &str| -> Result<usize> {
            index
                .get(name)
                .copied()
                .ok_or_else(|| LoanError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: required(COL_DATE)?,
            borrower: required(COL_BORROWER)?,
            campus: required(COL_CAMPUS)?,
            status: required(COL_STATUS)?,
            principal: required(COL_PRINCIPAL)?,
            interest: required(COL_INTEREST)?,
            commission: required(COL_COMMISSION)?,
            installment: required(COL_INSTALLMENT)?,
            number: index.get(COL_NUMBER).copied(),
            cheque: index.get(COL_CHEQUE).copied(),
            code: index.get(COL_CODE).copied(),
            start_date: index.get(COL_START_DATE).copied(),
            end_date: index.get(COL_END_DATE).copied(),
        })
    }

    /// Build a record from `row`, returning it with the number of non-blank
    /// cells that could not be coerced.
    fn build_record(&self, row: &[CellValue], line: usize) -> (LoanRecord, usize) {
        let cell = |idx: usize| row.get(idx).unwrap_or(&CellValue::Empty);
        let optional = |idx: Option<usize>| idx.map(cell).unwrap_or(&CellValue::Empty);
        let mut degraded = 0usize;

        let mut date_field = |name: &str, value: &CellValue| {
            let parsed = DateProcessor::parse(value);
            if parsed.is_none() && !value.is_empty() {
                debug!("line {}: {} {:?} is not a date", line, name, value);
                degraded += 1;
            }
            parsed
        };
        let date = date_field(COL_DATE, cell(self.date));
        let start_date = date_field(COL_START_DATE, optional(self.start_date));
        let end_date = date_field(COL_END_DATE, optional(self.end_date));

        let mut amount_field = |name: &str, value: &CellValue| {
            let parsed = AmountProcessor::parse(value);
            if parsed.is_none() && !value.is_empty() {
                debug!("line {}: {} {:?} is not a number", line, name, value);
                degraded += 1;
            }
            parsed
        };
        let principal = amount_field(COL_PRINCIPAL, cell(self.principal));
        let interest = amount_field(COL_INTEREST, cell(self.interest));
        let commission = amount_field(COL_COMMISSION, cell(self.commission));
        let installment = amount_field(COL_INSTALLMENT, cell(self.installment));

        let record = LoanRecord {
            date,
            borrower: TextProcessor::to_text(cell(self.borrower)),
            campus: TextProcessor::to_text(cell(self.campus)),
            status: TextProcessor::to_text(cell(self.status)),
            principal,
            interest,
            commission,
            installment,
            extras: LoanExtras {
                number: TextProcessor::to_optional_text(optional(self.number)),
                cheque: TextProcessor::to_optional_text(optional(self.cheque)),
                code: TextProcessor::to_optional_text(optional(self.code)),
                start_date,
                end_date,
            },
        };
        (record, degraded)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
