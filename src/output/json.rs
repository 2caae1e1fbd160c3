// JSON export of a full analysis cycle.
//
// Non-finite impact scores serialize as null.

use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::Analysis;

/// Write the analysis as pretty JSON. Returns the path written.
pub fn write_analysis(analysis: &Analysis, output_path: &str) -> Result<String> {
    if let Some(parent) = Path::new(output_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for {}", output_path))?;
        }
    }

    let json = to_json(analysis)?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis to {}", output_path))?;

    Ok(output_path.to_string())
}

pub fn to_json(analysis: &Analysis) -> Result<String> {
    serde_json::to_string_pretty(analysis).context("Failed to serialize analysis")
}
