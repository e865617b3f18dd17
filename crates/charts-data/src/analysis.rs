//! Analysis orchestration.
//!
//! Ties the pipeline together for one workbook: sheet selection and
//! classification, row materialization, scope filtering, and chart
//! building. The result is a serializable report whose content is a pure
//! function of the workbook document and the analysis configuration.

use serde::Serialize;
use tracing::{debug, info};

use charts_core::error::{ChartsError, Result};
use charts_core::models::{ChartDescriptor, SessionRow, Sheet, Workbook};
use charts_core::normalize::{date_to_month_key, infer_semester_label, sort_month_keys};
use charts_core::schema::ColumnSchema;
use charts_core::settings::AnalysisConfig;

use crate::builder::build_session_charts;
use crate::filter::{collect_domain_rows, filter_by_month, is_skippable_sheet_name, skip_patterns};

// ── Scope ─────────────────────────────────────────────────────────────────────

/// What slice of the workbook one analysis covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// One month of one sheet. `None` selects the earliest month present.
    Month(Option<String>),
    /// Every tutoring-data sheet of the workbook, merged.
    Semester,
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Counts and context for one report. Derived entirely from the input
/// document, so identical inputs serialize to identical reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub file_name: String,
    pub sheets_scanned: usize,
    pub sheets_classified: usize,
    /// Session rows materialized before scope filtering.
    pub rows_considered: usize,
    /// Session rows that survived the scope filter.
    pub rows_in_scope: usize,
    /// Month keys present in the considered rows, chronological.
    pub months_available: Vec<String>,
}

/// One complete analysis result: the chart descriptors plus their context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartReport {
    /// Human-facing scope label, e.g. `"September 2024"` or
    /// `"Fall Semester 2024"`.
    pub label: String,
    pub scope: String,
    pub charts: Vec<ChartDescriptor>,
    pub metadata: ReportMetadata,
}

// ── Sheet classification listing ──────────────────────────────────────────────

/// Per-sheet classification summary, for the `--list-sheets` listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetStatus {
    pub name: String,
    /// Name matched a configured skip pattern.
    pub skipped: bool,
    /// The four required columns all resolved.
    pub domain_data: bool,
    pub has_duration: bool,
}

/// Classify every sheet of the workbook without aggregating anything.
pub fn classify_sheets(workbook: &Workbook, config: &AnalysisConfig) -> Vec<SheetStatus> {
    let patterns = skip_patterns(&config.skip_sheet_patterns);
    workbook
        .sheets
        .iter()
        .map(|sheet| {
            let schema = ColumnSchema::resolve(&sheet.headers, &config.candidates);
            SheetStatus {
                name: sheet.name.clone(),
                skipped: is_skippable_sheet_name(&sheet.name, &patterns),
                domain_data: schema.is_domain_data(),
                has_duration: schema.duration.is_some(),
            }
        })
        .collect()
}

// ── Month helpers ─────────────────────────────────────────────────────────────

/// Distinct month keys present in `rows`, sorted chronologically.
pub fn months_in_rows(rows: &[SessionRow]) -> Vec<String> {
    let mut months: Vec<String> = Vec::new();
    for row in rows {
        if let Some(key) = date_to_month_key(&row.date) {
            if !months.contains(&key) {
                months.push(key);
            }
        }
    }
    sort_month_keys(&mut months);
    months
}

/// The month keys available in the sheet a month-scope analysis would use.
pub fn list_months(
    workbook: &Workbook,
    sheet: Option<&str>,
    config: &AnalysisConfig,
) -> Result<Vec<String>> {
    let (sheet, schema) = select_month_sheet(workbook, sheet, config)?;
    Ok(months_in_rows(&schema.extract_rows(sheet)))
}

/// Pick the sheet a month-scope analysis operates on: the named sheet when
/// given, otherwise the first sheet that classifies as tutoring data
/// (skip-pattern names excluded).
fn select_month_sheet<'a>(
    workbook: &'a Workbook,
    sheet: Option<&str>,
    config: &AnalysisConfig,
) -> Result<(&'a Sheet, ColumnSchema)> {
    if let Some(name) = sheet {
        let sheet = workbook
            .sheet(name)
            .ok_or_else(|| ChartsError::SheetNotFound(name.to_string()))?;
        let schema = ColumnSchema::resolve(&sheet.headers, &config.candidates);
        if !schema.is_domain_data() {
            return Err(ChartsError::NotDomainData(sheet.name.clone()));
        }
        return Ok((sheet, schema));
    }

    let patterns = skip_patterns(&config.skip_sheet_patterns);
    for sheet in &workbook.sheets {
        if is_skippable_sheet_name(&sheet.name, &patterns) {
            continue;
        }
        let schema = ColumnSchema::resolve(&sheet.headers, &config.candidates);
        if schema.is_domain_data() {
            debug!("selected sheet {:?} for month analysis", sheet.name);
            return Ok((sheet, schema));
        }
    }
    Err(ChartsError::Config(format!(
        "no tutoring data sheet in {}",
        workbook.file_name
    )))
}

// ── Analysis ──────────────────────────────────────────────────────────────────

/// Run one analysis over `workbook` and produce its report.
pub fn analyze_workbook(
    workbook: &Workbook,
    scope: &Scope,
    sheet: Option<&str>,
    config: &AnalysisConfig,
) -> Result<ChartReport> {
    config.validate()?;
    match scope {
        Scope::Month(month) => analyze_month(workbook, month.as_deref(), sheet, config),
        Scope::Semester => analyze_semester(workbook, config),
    }
}

fn analyze_month(
    workbook: &Workbook,
    month: Option<&str>,
    sheet: Option<&str>,
    config: &AnalysisConfig,
) -> Result<ChartReport> {
    let (sheet, schema) = select_month_sheet(workbook, sheet, config)?;
    let rows = schema.extract_rows(sheet);
    let months = months_in_rows(&rows);

    let target = match month {
        Some(key) => key.to_string(),
        // Default to the earliest month present in the sheet.
        None => months.first().cloned().ok_or_else(|| {
            ChartsError::Config(format!("no parsable dates in sheet {:?}", sheet.name))
        })?,
    };

    let in_scope = filter_by_month(&rows, Some(&target));
    info!(
        "month analysis: sheet {:?}, month {:?}, {} of {} rows",
        sheet.name,
        target,
        in_scope.len(),
        rows.len()
    );

    let charts = build_session_charts(
        &in_scope,
        &target,
        &config.time_slots,
        "month",
        schema.duration.is_some(),
    );
    Ok(ChartReport {
        label: target,
        scope: "month".to_string(),
        charts,
        metadata: ReportMetadata {
            file_name: workbook.file_name.clone(),
            sheets_scanned: workbook.sheets.len(),
            sheets_classified: 1,
            rows_considered: rows.len(),
            rows_in_scope: in_scope.len(),
            months_available: months,
        },
    })
}

fn analyze_semester(workbook: &Workbook, config: &AnalysisConfig) -> Result<ChartReport> {
    let patterns = skip_patterns(&config.skip_sheet_patterns);
    let collected = collect_domain_rows(workbook, &config.candidates, &patterns);
    let label = infer_semester_label(&workbook.file_name, &workbook.sheet_names());
    let months = months_in_rows(&collected.rows);

    info!(
        "semester analysis: {:?}, {} rows from {} of {} sheets",
        label,
        collected.rows.len(),
        collected.sheets_classified,
        collected.sheets_scanned
    );

    let charts = build_session_charts(
        &collected.rows,
        &label,
        &config.time_slots,
        "semester",
        collected.has_duration,
    );
    let rows_considered = collected.rows.len();
    Ok(ChartReport {
        label,
        scope: "semester".to_string(),
        charts,
        metadata: ReportMetadata {
            file_name: workbook.file_name.clone(),
            sheets_scanned: collected.sheets_scanned,
            sheets_classified: collected.sheets_classified,
            rows_considered,
            rows_in_scope: rows_considered,
            months_available: months,
        },
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
