//! Column schema resolution.
//!
//! Maps semantic roles (date, sign-in time, tutor, subject, duration) to the
//! actual column headers found in a sheet, using fuzzy case- and
//! space-insensitive candidate matching. A sheet classifies as tutoring
//! ("domain") data when the four required roles all resolve.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{SessionRow, Sheet};

// ── Header normalization ──────────────────────────────────────────────────────

/// Normalize a header for comparison: lowercase, trimmed, internal
/// whitespace runs collapsed to single spaces.
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve the first candidate that matches one of `headers`.
///
/// Candidates are scanned in priority order; the returned value is the
/// *actual* header string from the sheet, never the candidate spelling.
/// When two headers normalize identically the first one wins.
pub fn find_column(headers: &[String], candidates: &[String]) -> Option<String> {
    let mut by_normalized: HashMap<String, &String> = HashMap::new();
    for header in headers {
        by_normalized.entry(normalize_header(header)).or_insert(header);
    }
    candidates
        .iter()
        .find_map(|c| by_normalized.get(&normalize_header(c)).map(|h| (*h).clone()))
}

// ── RoleCandidates ────────────────────────────────────────────────────────────

/// Ordered acceptable header spellings per semantic role.
///
/// Configuration data, not derived from the sheet; the defaults match the
/// attendance-log exports this tool was built for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleCandidates {
    pub date: Vec<String>,
    pub sign_in: Vec<String>,
    pub tutor: Vec<String>,
    pub subject: Vec<String>,
    pub duration: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RoleCandidates {
    fn default() -> Self {
        Self {
            date: strings(&["Date", "Session Date", "Visit Date"]),
            sign_in: strings(&[
                "Sign in Time",
                "Sign-in Time",
                "Signin Time",
                "Sign In Time",
            ]),
            tutor: strings(&["Tutor", "Tutors"]),
            subject: strings(&["Subject/Class", "Subject", "Course", "Course Name", "Class"]),
            duration: strings(&["Time", "Duration", "Total Time", "Tutoring Time"]),
        }
    }
}

// ── ColumnSchema ──────────────────────────────────────────────────────────────

/// Role → actual header map for one sheet. Built once per header set;
/// immutable thereafter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSchema {
    pub date: Option<String>,
    pub sign_in: Option<String>,
    pub tutor: Option<String>,
    pub subject: Option<String>,
    pub duration: Option<String>,
}

impl ColumnSchema {
    /// Resolve every role against `headers`. Pure function of the header
    /// list and candidate tables.
    pub fn resolve(headers: &[String], candidates: &RoleCandidates) -> Self {
        Self {
            date: find_column(headers, &candidates.date),
            sign_in: find_column(headers, &candidates.sign_in),
            tutor: find_column(headers, &candidates.tutor),
            subject: find_column(headers, &candidates.subject),
            duration: find_column(headers, &candidates.duration),
        }
    }

    /// A sheet is tutoring data iff date, sign-in time, tutor and subject
    /// all resolved. Duration is optional — its absence disables only the
    /// duration-derived charts.
    pub fn is_domain_data(&self) -> bool {
        self.date.is_some()
            && self.sign_in.is_some()
            && self.tutor.is_some()
            && self.subject.is_some()
    }

    /// Materialize the sheet's rows as role-mapped [`SessionRow`]s.
    pub fn extract_rows(&self, sheet: &Sheet) -> Vec<SessionRow> {
        sheet
            .rows
            .iter()
            .map(|row| {
                let cell_for = |header: &Option<String>| {
                    header
                        .as_deref()
                        .map(|h| sheet.cell(row, h).clone())
                        .unwrap_or_default()
                };
                let text_for = |header: &Option<String>| {
                    header
                        .as_deref()
                        .and_then(|h| sheet.cell(row, h).display_text())
                        .unwrap_or_default()
                };
                SessionRow {
                    date: cell_for(&self.date),
                    sign_in: cell_for(&self.sign_in),
                    duration: cell_for(&self.duration),
                    tutor: text_for(&self.tutor),
                    subject: text_for(&self.subject),
                }
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellValue, RawRow};

    fn headers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ── normalize_header ─────────────────────────────────────────────────────

    #[test]
    fn test_normalize_header_case_and_space() {
        assert_eq!(normalize_header("  Sign  in   Time "), "sign in time");
        assert_eq!(normalize_header("TUTOR"), "tutor");
        assert_eq!(normalize_header(""), "");
    }

    // ── find_column ──────────────────────────────────────────────────────────

    #[test]
    fn test_find_column_returns_actual_header() {
        let hs = headers(&["SIGN IN  TIME", "Tutor"]);
        let found = find_column(&hs, &strings(&["Sign in Time"]));
        assert_eq!(found, Some("SIGN IN  TIME".to_string()));
    }

    #[test]
    fn test_find_column_candidate_priority() {
        let hs = headers(&["Course", "Subject"]);
        // "Subject/Class" misses, "Subject" wins before "Course".
        let found = find_column(&hs, &strings(&["Subject/Class", "Subject", "Course"]));
        assert_eq!(found, Some("Subject".to_string()));
    }

    #[test]
    fn test_find_column_none_when_absent() {
        let hs = headers(&["Date", "Tutor"]);
        assert_eq!(find_column(&hs, &strings(&["Duration"])), None);
    }

    #[test]
    fn test_find_column_duplicate_normalized_headers_first_wins() {
        let hs = headers(&["Tutor", " tutor "]);
        assert_eq!(
            find_column(&hs, &strings(&["Tutor"])),
            Some("Tutor".to_string())
        );
    }

    // ── ColumnSchema::resolve / is_domain_data ───────────────────────────────

    #[test]
    fn test_resolve_full_schema() {
        let hs = headers(&["Date", "Sign in Time", "Tutor", "Subject/Class", "Time"]);
        let schema = ColumnSchema::resolve(&hs, &RoleCandidates::default());
        assert_eq!(schema.date.as_deref(), Some("Date"));
        assert_eq!(schema.sign_in.as_deref(), Some("Sign in Time"));
        assert_eq!(schema.tutor.as_deref(), Some("Tutor"));
        assert_eq!(schema.subject.as_deref(), Some("Subject/Class"));
        assert_eq!(schema.duration.as_deref(), Some("Time"));
        assert!(schema.is_domain_data());
    }

    #[test]
    fn test_resolve_duration_optional() {
        let hs = headers(&["Visit Date", "Sign-In Time", "Tutors", "Course"]);
        let schema = ColumnSchema::resolve(&hs, &RoleCandidates::default());
        assert!(schema.duration.is_none());
        assert!(schema.is_domain_data());
    }

    #[test]
    fn test_resolve_missing_required_role() {
        let hs = headers(&["Date", "Tutor", "Subject"]);
        let schema = ColumnSchema::resolve(&hs, &RoleCandidates::default());
        assert!(schema.sign_in.is_none());
        assert!(!schema.is_domain_data());
    }

    // ── extract_rows ─────────────────────────────────────────────────────────

    fn sample_sheet() -> Sheet {
        let mut row: RawRow = RawRow::new();
        row.insert(
            "Date".to_string(),
            CellValue::Text("2024-09-05".to_string()),
        );
        row.insert(
            "Sign in Time".to_string(),
            CellValue::Text("10:45 AM".to_string()),
        );
        row.insert("Tutor".to_string(), CellValue::Text("  Alice ".to_string()));
        row.insert("Subject".to_string(), CellValue::Text("Math".to_string()));
        Sheet {
            name: "Sep. 2024".to_string(),
            headers: headers(&["Date", "Sign in Time", "Tutor", "Subject"]),
            rows: vec![row],
        }
    }

    #[test]
    fn test_extract_rows_maps_roles() {
        let sheet = sample_sheet();
        let schema = ColumnSchema::resolve(&sheet.headers, &RoleCandidates::default());
        let rows = schema.extract_rows(&sheet);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tutor, "Alice");
        assert_eq!(rows[0].subject, "Math");
        assert_eq!(rows[0].sign_in, CellValue::Text("10:45 AM".to_string()));
        // No duration column resolved → missing cell.
        assert!(rows[0].duration.is_missing());
    }

    #[test]
    fn test_extract_rows_blank_tutor_is_empty_string() {
        let mut sheet = sample_sheet();
        sheet.rows[0].insert("Tutor".to_string(), CellValue::Text("   ".to_string()));
        let schema = ColumnSchema::resolve(&sheet.headers, &RoleCandidates::default());
        let rows = schema.extract_rows(&sheet);
        assert_eq!(rows[0].tutor, "");
    }
}
