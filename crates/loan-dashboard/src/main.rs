mod bootstrap;

use anyhow::{Context, Result};
use loan_core::settings::Settings;
use loan_data::analysis::{analyze_source, AnalysisOptions};
use loan_report::{console, export, json};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Loan Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Source: {}, Sheet: {}, Format: {}",
        settings.source.display(),
        settings.sheet,
        settings.format
    );

    let options = AnalysisOptions {
        statuses: settings.status_request(),
        campuses: settings.campus_request(),
        params: settings.business_params(),
        month_names: settings.month_names()?,
        year: settings.year,
    };

    let report = analyze_source(&settings.source, &settings.sheet, &options)
        .with_context(|| format!("building report from {}", settings.source.display()))?;

    match settings.format.as_str() {
        "json" => json::print_json(&report)?,
        "csv" => {
            let paths = export::write_csv_reports(&settings.output_dir, &report)?;
            for path in paths {
                println!("{}", path.display());
            }
        }
        _ => console::print_report(&report),
    }

    Ok(())
}
