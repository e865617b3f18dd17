//! Workbook document discovery and loading.
//!
//! Workbooks arrive as JSON documents produced by the spreadsheet-decoding
//! collaborator. The input argument is either one document or a directory
//! to scan recursively for `.json` files.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use charts_core::error::{ChartsError, Result};
use charts_core::models::Workbook;

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Find all `.json` files recursively under `dir`, sorted by path.
pub fn find_workbook_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Input path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Resolve the input argument to the list of workbook documents to analyze.
///
/// A file is taken as-is; a directory is scanned and must contain at least
/// one `.json` document.
pub fn resolve_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        let files = find_workbook_files(input);
        if files.is_empty() {
            return Err(ChartsError::NoWorkbooks(input.to_path_buf()));
        }
        debug!("Found {} workbook documents in {}", files.len(), input.display());
        Ok(files)
    } else {
        Ok(vec![input.to_path_buf()])
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load and decode one workbook document.
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let content = std::fs::read_to_string(path).map_err(|source| ChartsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let workbook: Workbook = serde_json::from_str(&content)?;
    debug!(
        "Loaded workbook {:?} with {} sheets",
        workbook.file_name,
        workbook.sheets.len()
    );
    Ok(workbook)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
