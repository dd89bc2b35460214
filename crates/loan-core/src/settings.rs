use clap::{CommandFactory, Parser};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cells::AmountProcessor;
use crate::error::Result;
use crate::locale::MonthNames;
use crate::models::BusinessParams;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Financial summary for a loan portfolio spreadsheet
#[derive(Parser, Debug, Clone)]
#[command(
    name = "loan-dashboard",
    about = "Financial summary for a loan portfolio spreadsheet",
    version
)]
pub struct Settings {
    /// Spreadsheet with the loan records (.xlsx, .xls, .ods or .csv)
    #[arg(default_value = "prestamos.xlsx")]
    pub source: PathBuf,

    /// Worksheet holding the loan table (ignored for CSV)
    #[arg(long, default_value = "Resumen")]
    pub sheet: String,

    /// Status to include; repeat for several (default: every status present)
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// Select no status at all (empty dashboard)
    #[arg(long, conflicts_with = "statuses")]
    pub no_status: bool,

    /// Campus to include; repeat for several (default: every campus present)
    #[arg(long = "campus")]
    pub campuses: Vec<String>,

    /// Select no campus at all (empty dashboard)
    #[arg(long, conflicts_with = "campuses")]
    pub no_campus: bool,

    /// Restrict the monthly chart series to one year
    #[arg(long)]
    pub year: Option<i32>,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json", "csv"])]
    pub format: String,

    /// Directory for CSV output
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Capital the operation started with
    #[arg(long, value_parser = parse_amount)]
    pub initial_capital: Option<Decimal>,

    /// Gains already handed out to the partner
    #[arg(long, value_parser = parse_amount)]
    pub distributed: Option<Decimal>,

    /// Card title for the cash position
    #[arg(long)]
    pub cash_holder: Option<String>,

    /// Card title for the distributed gains
    #[arg(long)]
    pub distribution_recipient: Option<String>,

    /// Month-name locale
    #[arg(long, default_value = "es", value_parser = ["es", "en"])]
    pub locale: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved business parameters
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Bookkeeping values persisted to `~/.loan-dashboard/last_used.json`.
///
/// Capital and distributions change by hand every few weeks, so the last
/// values given on the command line are remembered.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_capital: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributed: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".loan-dashboard").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and merge with last-used params where no explicit
    /// CLI value was provided, then persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation, taking args and an explicit config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug_flag(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        if settings.initial_capital.is_none() {
            settings.initial_capital = last.initial_capital.and_then(AmountProcessor::bounded);
        }
        if settings.distributed.is_none() {
            settings.distributed = last.distributed.and_then(AmountProcessor::bounded);
        }
        if settings.cash_holder.is_none() {
            settings.cash_holder = last.cash_holder;
        }
        if settings.distribution_recipient.is_none() {
            settings.distribution_recipient = last.distribution_recipient;
        }
        if !is_arg_explicitly_set(&matches, "locale") {
            if let Some(v) = last.locale {
                settings.locale = v;
            }
        }

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        Self::apply_debug_flag(settings)
    }

    /// Business parameters for this run; unset values take their defaults.
    pub fn business_params(&self) -> BusinessParams {
        let defaults = BusinessParams::default();
        BusinessParams {
            initial_capital: self.initial_capital.unwrap_or(defaults.initial_capital),
            distributed: self.distributed.unwrap_or(defaults.distributed),
            cash_holder: self
                .cash_holder
                .clone()
                .unwrap_or(defaults.cash_holder),
            distribution_recipient: self
                .distribution_recipient
                .clone()
                .unwrap_or(defaults.distribution_recipient),
        }
    }

    /// Requested statuses: `None` selects every status present, `Some`
    /// selects exactly the listed ones (possibly none).
    pub fn status_request(&self) -> Option<Vec<String>> {
        axis_request(self.no_status, &self.statuses)
    }

    /// Requested campuses, with the same convention as [`Self::status_request`].
    pub fn campus_request(&self) -> Option<Vec<String>> {
        axis_request(self.no_campus, &self.campuses)
    }

    /// Month-name table for the configured locale.
    pub fn month_names(&self) -> Result<MonthNames> {
        MonthNames::from_code(&self.locale)
    }

    /// `--debug` overrides log level.
    fn apply_debug_flag(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            initial_capital: s.initial_capital,
            distributed: s.distributed,
            cash_holder: s.cash_holder.clone(),
            distribution_recipient: s.distribution_recipient.clone(),
            locale: Some(s.locale.clone()),
        }
    }
}

fn axis_request(none: bool, values: &[String]) -> Option<Vec<String>> {
    if none {
        Some(Vec::new())
    } else if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

/// Parse a business amount, rejecting values outside the accepted range.
fn parse_amount(raw: &str) -> std::result::Result<Decimal, String> {
    let value: Decimal = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount \"{}\": {}", raw, e))?;
    AmountProcessor::bounded(value).ok_or_else(|| format!("amount {} is out of range", raw))
}

/// Returns `true` when `name` was supplied explicitly on the command line.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
