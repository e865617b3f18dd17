mod bootstrap;

use anyhow::Result;
use clap::Parser;

use charts_core::settings::{AnalysisConfig, Settings};
use charts_data::analysis::{analyze_workbook, classify_sheets, list_months, ChartReport, Scope};
use charts_data::reader::{load_workbook, resolve_inputs};

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("tutor-charts v{} starting", env!("CARGO_PKG_VERSION"));

    let config = AnalysisConfig::load_or_discover(settings.config.as_deref())?;
    let inputs = resolve_inputs(&settings.input)?;

    if settings.list_sheets {
        for path in &inputs {
            let workbook = load_workbook(path)?;
            println!("{}:", workbook.file_name);
            for status in classify_sheets(&workbook, &config) {
                let class = if status.skipped {
                    "skipped"
                } else if status.domain_data && status.has_duration {
                    "data"
                } else if status.domain_data {
                    "data (no duration column)"
                } else {
                    "other"
                };
                println!("  {}  [{}]", status.name, class);
            }
        }
        return Ok(());
    }

    if settings.list_months {
        for path in &inputs {
            let workbook = load_workbook(path)?;
            for month in list_months(&workbook, settings.sheet.as_deref(), &config)? {
                println!("{}", month);
            }
        }
        return Ok(());
    }

    let scope = match settings.scope.as_str() {
        "semester" => Scope::Semester,
        _ => Scope::Month(settings.month.clone()),
    };

    let mut reports: Vec<ChartReport> = Vec::with_capacity(inputs.len());
    for path in &inputs {
        let workbook = load_workbook(path)?;
        reports.push(analyze_workbook(
            &workbook,
            &scope,
            settings.sheet.as_deref(),
            &config,
        )?);
    }

    // One input serializes as a single report object, several as an array.
    let json = if reports.len() == 1 {
        serde_json::to_string_pretty(&reports[0])?
    } else {
        serde_json::to_string_pretty(&reports)?
    };

    match &settings.output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
