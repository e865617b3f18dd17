use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{ChartsError, Result};
use crate::schema::RoleCandidates;
use crate::timeslot::{default_time_slots, TimeSlot};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Chart-ready aggregates from tutoring session spreadsheets
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tutor-charts",
    about = "Chart-ready aggregates from tutoring session spreadsheets",
    version
)]
pub struct Settings {
    /// Workbook JSON document, or a directory to scan for workbook documents
    pub input: PathBuf,

    /// Aggregation scope
    #[arg(long, default_value = "month", value_parser = ["month", "semester"])]
    pub scope: String,

    /// Month key to aggregate, e.g. "September 2024"
    /// (defaults to the earliest month present in the sheet)
    #[arg(long)]
    pub month: Option<String>,

    /// Sheet to analyze (defaults to the first sheet that classifies as
    /// tutoring data)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Analysis config file (time slots, column candidates, skip patterns)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// List the month keys available in the selected sheet and exit
    #[arg(long)]
    pub list_months: bool,

    /// List sheet names with their classification and exit
    #[arg(long)]
    pub list_sheets: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// The log level with the `--debug` override applied.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}

// ── AnalysisConfig ─────────────────────────────────────────────────────────────

/// The injected configuration data for one analysis: the time-slot table,
/// the per-role column candidates and the non-data sheet-name patterns.
///
/// Loaded from JSON; every field falls back to the built-in defaults when
/// omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub time_slots: Vec<TimeSlot>,
    pub candidates: RoleCandidates,
    /// Case-insensitive regex fragments; sheets whose names match any of
    /// them are skipped in the semester scope (summary/listing/schedule
    /// sheets).
    pub skip_sheet_patterns: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_slots: default_time_slots(),
            candidates: RoleCandidates::default(),
            skip_sheet_patterns: vec![
                "summary".to_string(),
                "listing".to_string(),
                "schedule".to_string(),
            ],
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ChartsError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The default per-user config location: `~/.tutor-charts/config.json`.
    pub fn discover_path() -> Option<PathBuf> {
        let path = dirs::home_dir()?.join(".tutor-charts").join("config.json");
        path.exists().then_some(path)
    }

    /// Use the explicit path when given, otherwise the discovered per-user
    /// config, otherwise the built-in defaults. A broken per-user config
    /// degrades to the defaults with a warning; an explicit path does not.
    pub fn load_or_discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match Self::discover_path() {
            Some(path) => match Self::load_from(&path) {
                Ok(config) => Ok(config),
                Err(err) => {
                    warn!("ignoring broken config {}: {}", path.display(), err);
                    Ok(Self::default())
                }
            },
            None => Ok(Self::default()),
        }
    }

    /// Enforce the time-slot invariants: intervals non-empty, ordered and
    /// non-overlapping, so a time value belongs to at most one slot.
    pub fn validate(&self) -> Result<()> {
        if self.time_slots.is_empty() {
            return Err(ChartsError::Config("time_slots must not be empty".to_string()));
        }
        for slot in &self.time_slots {
            if slot.start_min >= slot.end_min || slot.end_min > 1440 {
                return Err(ChartsError::Config(format!(
                    "invalid time slot \"{}\": [{}, {})",
                    slot.label, slot.start_min, slot.end_min
                )));
            }
        }
        for pair in self.time_slots.windows(2) {
            if pair[1].start_min < pair[0].end_min {
                return Err(ChartsError::Config(format!(
                    "time slots \"{}\" and \"{}\" overlap or are out of order",
                    pair[0].label, pair[1].label
                )));
            }
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
