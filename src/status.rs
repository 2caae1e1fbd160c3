// Dataset status display: file paths, sizes, roster and publication counts.

use std::path::Path;

use colored::Colorize;

use crate::config::Config;
use crate::records::Dataset;

/// Summary numbers for a loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub researchers: usize,
    pub works: usize,
    /// Works with a year inside the supported bounds
    pub dated_works: usize,
    pub projection_rows: Option<usize>,
    /// Mean field-weighted impact, NaN values excluded
    pub mean_fwci: Option<f64>,
    pub total_citations: u64,
}

impl DatasetSummary {
    pub fn of(dataset: &Dataset) -> Self {
        let scores: Vec<f64> = dataset
            .works
            .iter()
            .map(|w| w.fwci)
            .filter(|f| f.is_finite())
            .collect();
        let mean_fwci = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };

        Self {
            researchers: dataset.roster.len(),
            works: dataset.works.len(),
            dated_works: dataset.works.iter().filter(|w| w.year.is_some()).count(),
            projection_rows: dataset.projection.as_ref().map(Vec::len),
            mean_fwci,
            total_citations: dataset.works.iter().map(|w| w.cited_by_count).sum(),
        }
    }
}

/// Display dataset status to the terminal.
pub fn show(config: &Config, dataset: &Dataset) {
    println!("Roster: {}", describe_file(&config.roster_path));
    println!("Works: {}", describe_file(&config.works_path));
    match &config.projection_path {
        Some(path) => println!("Projection: {}", describe_file(path)),
        None => println!("Projection: {}", "not configured".dimmed()),
    }

    let summary = DatasetSummary::of(dataset);
    println!();
    println!("Researchers: {}", summary.researchers);
    println!(
        "Works: {} ({} dated within {}–{})",
        summary.works, summary.dated_works, dataset.bounds.min, dataset.bounds.max
    );
    match summary.projection_rows {
        Some(rows) => println!("Projection rows: {rows}"),
        None => {
            println!("Projection rows: none");
            println!("  Co-authorship falls back to name matching (or pass --derive-projection)");
        }
    }
    println!("Citations: {}", summary.total_citations);
    match summary.mean_fwci {
        Some(mean) => println!("Mean FWCI: {mean:.2}"),
        None => println!("Mean FWCI: n/a"),
    }
}

fn describe_file(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => format!("{} ({})", path.display(), format_bytes(meta.len())),
        Err(_) => format!("{} (missing)", path.display()),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
