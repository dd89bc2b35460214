use serde::{Deserialize, Serialize};

use crate::error::{LoanError, Result};

const SPANISH: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const ENGLISH: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Lookup table from month number to display name.
///
/// Only used to label month buckets; ordering always comes from the month
/// number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthNames {
    names: Vec<String>,
}

impl Default for MonthNames {
    fn default() -> Self {
        Self::spanish()
    }
}

impl MonthNames {
    pub fn spanish() -> Self {
        Self::from_table(&SPANISH)
    }

    pub fn english() -> Self {
        Self::from_table(&ENGLISH)
    }

    /// Build a table from twelve caller-supplied names, January first.
    pub fn custom(names: Vec<String>) -> Result<Self> {
        if names.len() != 12 {
            return Err(LoanError::Config(format!(
                "month table needs 12 names, got {}",
                names.len()
            )));
        }
        Ok(Self { names })
    }

    /// Resolve a locale code (`"es"` or `"en"`).
    pub fn from_code(code: &str) -> Result<Self> {
        match code.to_lowercase().as_str() {
            "es" => Ok(Self::spanish()),
            "en" => Ok(Self::english()),
            other => Err(LoanError::Config(format!("unknown locale: {other}"))),
        }
    }

    /// Name for `month` (1 = January). Out-of-range months fall back to the
    /// number itself.
    pub fn label(&self, month: u32) -> String {
        month
            .checked_sub(1)
            .and_then(|idx| self.names.get(idx as usize))
            .cloned()
            .unwrap_or_else(|| month.to_string())
    }

    fn from_table(table: &[&str; 12]) -> Self {
        Self {
            names: table.iter().map(|s| s.to_string()).collect(),
        }
    }
}
