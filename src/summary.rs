//! Directory summary pass
//!
//! Snapshots the image directory after conversion and totals original raster
//! sizes against converted sizes. Files left over from earlier runs count too.

use crate::Result;
use std::fs;
use std::path::Path;

/// Documentation and vector assets never listed.
const EXCLUDED_SUFFIXES: [&str; 2] = [".md", ".svg"];
const ORIGINAL_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
const OPTIMIZED_EXTENSIONS: [&str; 2] = ["webp", "avif"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub name: String,
    pub byte_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySummary {
    pub entries: Vec<SummaryEntry>,
    pub total_original: u64,
    pub total_optimized: u64,
}

enum SizeClass {
    Original,
    Optimized,
    Other,
}

fn classify(name: &str) -> SizeClass {
    let extension = Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if ORIGINAL_EXTENSIONS.contains(&extension.as_str()) {
        SizeClass::Original
    } else if OPTIMIZED_EXTENSIONS.contains(&extension.as_str()) {
        SizeClass::Optimized
    } else {
        SizeClass::Other
    }
}

/// List every entry in `dir` (sorted by name), subdirectories included, and
/// accumulate totals by extension. Listing and stat failures propagate.
pub fn scan_directory(dir: &Path) -> Result<DirectorySummary> {
    let mut summary = DirectorySummary::default();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();

        if EXCLUDED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            continue;
        }

        // Follows symlinks, so a linked image reports its target's size.
        let byte_size = fs::metadata(entry.path())?.len();
        match classify(&name) {
            SizeClass::Original => summary.total_original += byte_size,
            SizeClass::Optimized => summary.total_optimized += byte_size,
            SizeClass::Other => {}
        }

        summary.entries.push(SummaryEntry { name, byte_size });
    }

    summary.entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(summary)
}
