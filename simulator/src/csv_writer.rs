use chrono::Local;
use csv::Writer;
use log::{debug, info, warn};
use shared::constants::{ACCIDENT_COLUMN, CONGESTION_COLUMN};
use shared::SimulationResults;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// `dir/stem_YYYYmmdd_HHMMSS.ext`
pub fn timestamped(path: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let stem = path.file_stem().map_or_else(|| "simulation_results".into(), |s| s.to_string_lossy());
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{timestamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{timestamp}"),
    };
    path.with_file_name(name)
}

/// Writes one row per trial, in trial order. An empty run still gets the header.
pub fn write_results_csv(
    results: &SimulationResults,
    path: &Path,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if results.is_empty() {
        warn!("No results to save, writing header only to {}", path.display());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    debug!("Saving {} results to {}", results.len(), path.display());
    let mut writer = Writer::from_path(path)?;

    writer.write_record([CONGESTION_COLUMN, ACCIDENT_COLUMN])?;
    for r in results {
        writer.write_record(&[
            r.congestion_probability.to_string(),
            r.accident_probability.to_string(),
        ])?;
    }

    writer.flush()?;
    info!("Results saved to {} with {} records", path.display(), results.len());
    Ok(())
}
