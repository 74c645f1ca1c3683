//! Writing CSV / JSON exports to disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use timeline_data::analysis::TimelineAnalysis;
use timeline_data::export::{export_file_name, to_csv, to_json, ExportFormat};

/// Make an export name safe as a single path component.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

/// Write the requested exports into `dir`, returning the written paths.
pub fn write_exports(
    analysis: &TimelineAnalysis,
    url: &str,
    year: u16,
    dir: &Path,
    csv: bool,
    json: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if !csv && !json {
        return Ok(written);
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    if csv {
        let path = dir.join(sanitize_file_name(&export_file_name(url, year, ExportFormat::Csv)));
        std::fs::write(&path, to_csv(&analysis.captures, &analysis.changes))
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote CSV export");
        written.push(path);
    }

    if json {
        let path = dir.join(sanitize_file_name(&export_file_name(url, year, ExportFormat::Json)));
        let body = to_json(&analysis.captures, url, year).context("failed to encode JSON export")?;
        std::fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote JSON export");
        written.push(path);
    }

    Ok(written)
}
