use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── CellValue ─────────────────────────────────────────────────────────────────

/// A single spreadsheet cell, classified once at ingestion.
///
/// Every downstream normalizer pattern-matches over this closed set instead of
/// re-probing runtime types. The untagged serde representation performs the
/// classification while a workbook document is being deserialized:
///
/// * JSON `null` → [`CellValue::Missing`]
/// * JSON number → [`CellValue::Number`]
/// * ISO-8601 date-time string → [`CellValue::DateTime`]
/// * any other string → [`CellValue::Text`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Absent or null cell.
    #[default]
    Missing,
    /// A numeric cell. May encode a fractional-day time, a spreadsheet
    /// date serial, or a plain number depending on the column.
    Number(f64),
    /// A native temporal cell (naive local date-time, no timezone).
    DateTime(NaiveDateTime),
    /// Free text.
    Text(String),
}

impl CellValue {
    /// `true` for [`CellValue::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// The cell rendered as trimmed display text, for grouping keys.
    ///
    /// Returns `None` for missing cells, temporal cells and blank text so
    /// that blank group values never produce an aggregate key. Numbers keep
    /// the original coercion: `42.0` renders as `"42"`.
    pub fn display_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(n) if n.is_finite() => Some(format_number(*n)),
            _ => None,
        }
    }
}

/// Format a numeric cell the way a spreadsheet displays it: integral values
/// without the trailing `.0`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1.0e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ── Workbook / Sheet ──────────────────────────────────────────────────────────

/// One row of a sheet: header → cell value. A header absent from the map
/// reads as [`CellValue::Missing`].
pub type RawRow = HashMap<String, CellValue>;

/// A decoded worksheet: an ordered header list plus its rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name as it appeared in the workbook.
    pub name: String,
    /// Column headers in sheet order. All rows share this header set.
    pub headers: Vec<String>,
    /// Row objects keyed by header.
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

static MISSING_CELL: CellValue = CellValue::Missing;

impl Sheet {
    /// Look up a cell by header, treating absent keys as missing.
    pub fn cell<'a>(&self, row: &'a RawRow, header: &str) -> &'a CellValue {
        row.get(header).unwrap_or(&MISSING_CELL)
    }
}

/// A decoded workbook handed over by the spreadsheet-decoding collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbook {
    /// Original file name (used for semester label inference).
    pub file_name: String,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// All sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// Find a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

// ── SessionRow ────────────────────────────────────────────────────────────────

/// One tutoring session row with its cells mapped to semantic roles.
///
/// Materialized from a [`Sheet`] via a resolved column schema, so that rows
/// from sheets with differing header spellings can be merged for the
/// semester scope. Tutor and subject are already reduced to display text;
/// date, sign-in and duration stay as raw cells for the normalizers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRow {
    pub date: CellValue,
    pub sign_in: CellValue,
    pub duration: CellValue,
    /// Trimmed tutor name; empty when the cell was blank.
    pub tutor: String,
    /// Trimmed subject/class name; empty when the cell was blank.
    pub subject: String,
}

// ── Chart output contract ─────────────────────────────────────────────────────

/// A single bar of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDatum {
    pub name: String,
    pub value: f64,
}

/// How the rendering collaborator should color the bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorMode {
    /// Cycle through the renderer's default palette.
    Default,
    /// Use the per-slot colors from the time-slot configuration.
    TimeSlot,
}

/// One chart-ready descriptor consumed by the (external) rendering layer.
///
/// `id` is stable and unique within one generation pass; the renderer uses
/// it as a DOM / export target key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDescriptor {
    pub id: String,
    pub title: String,
    pub data: Vec<ChartDatum>,
    pub value_field: String,
    pub name_field: String,
    pub color_mode: ColorMode,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
