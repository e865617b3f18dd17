//! Sheet and row filtering.
//!
//! Two filters feed the aggregation stage: the month filter narrows a row
//! set to one month key, and the sheet-name skip filter keeps summary and
//! schedule sheets out of the semester merge.

use regex::Regex;
use tracing::{debug, warn};

use charts_core::models::{SessionRow, Workbook};
use charts_core::normalize::date_to_month_key;
use charts_core::schema::{ColumnSchema, RoleCandidates};

// ── Month filter ──────────────────────────────────────────────────────────────

/// Keep the rows whose date cell normalizes to `month_key`.
///
/// `None` means no month restriction (the semester scope). Rows whose date
/// produces no month key match no key and are dropped from any restricted
/// scope.
pub fn filter_by_month(rows: &[SessionRow], month_key: Option<&str>) -> Vec<SessionRow> {
    match month_key {
        None => rows.to_vec(),
        Some(key) => rows
            .iter()
            .filter(|row| date_to_month_key(&row.date).as_deref() == Some(key))
            .cloned()
            .collect(),
    }
}

// ── Sheet-name skip filter ────────────────────────────────────────────────────

/// Compile the configured skip fragments as case-insensitive patterns.
///
/// An invalid fragment is skipped with a warning rather than failing the
/// whole analysis.
pub fn skip_patterns(fragments: &[String]) -> Vec<Regex> {
    fragments
        .iter()
        .filter_map(|fragment| match Regex::new(&format!("(?i){}", fragment)) {
            Ok(re) => Some(re),
            Err(err) => {
                warn!("ignoring invalid skip pattern {:?}: {}", fragment, err);
                None
            }
        })
        .collect()
}

/// Whether a sheet name matches any skip pattern.
pub fn is_skippable_sheet_name(name: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|re| re.is_match(name))
}

// ── Domain-row collection ─────────────────────────────────────────────────────

/// The merged session rows of a workbook, plus classification counts for the
/// report metadata.
#[derive(Debug, Clone, Default)]
pub struct DomainRows {
    pub rows: Vec<SessionRow>,
    pub sheets_scanned: usize,
    pub sheets_classified: usize,
    /// `true` when at least one contributing sheet resolved a duration
    /// column.
    pub has_duration: bool,
}

/// Walk every sheet of `workbook`, skip the configured non-data names,
/// classify the rest, and merge the rows of every sheet that classifies as
/// tutoring data.
///
/// Each sheet resolves its own column schema, so sheets with differing
/// header spellings still merge into one row set.
pub fn collect_domain_rows(
    workbook: &Workbook,
    candidates: &RoleCandidates,
    patterns: &[Regex],
) -> DomainRows {
    let mut collected = DomainRows::default();
    for sheet in &workbook.sheets {
        collected.sheets_scanned += 1;
        if is_skippable_sheet_name(&sheet.name, patterns) {
            debug!("skipping sheet {:?} (name matches skip pattern)", sheet.name);
            continue;
        }
        let schema = ColumnSchema::resolve(&sheet.headers, candidates);
        if !schema.is_domain_data() {
            debug!("skipping sheet {:?} (not tutoring data)", sheet.name);
            continue;
        }
        collected.sheets_classified += 1;
        collected.has_duration |= schema.duration.is_some();
        collected.rows.extend(schema.extract_rows(sheet));
    }
    collected
}

// ── Tests ─────────────────────────────────────────────────────────────────────
