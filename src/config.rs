use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Datelike;

use crate::records::models::YearBounds;

/// Width of the default publication window, in years (current year included).
pub const DEFAULT_WINDOW_YEARS: i32 = 5;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default; only the two dataset files must actually exist.
pub struct Config {
    /// Roster JSON (one row per cohort member)
    pub roster_path: PathBuf,
    /// Deduplicated publication JSON (one row per work)
    pub works_path: PathBuf,
    /// Optional per-author projection JSON (one row per work × cohort author)
    pub projection_path: Option<PathBuf>,
    /// Earliest supported publication year
    pub year_min: i32,
    /// Latest supported publication year
    pub year_max: i32,
    /// Home country used when no cohort affiliation data is available
    pub home_country_fallback: String,
    /// Power iterations per eigenvector
    pub mds_iterations: usize,
    /// Seed for the power-iteration start vectors
    pub mds_seed: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let current_year = chrono::Local::now().year();

        Ok(Self {
            roster_path: env::var("COHORT_ROSTER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/roster.json")),
            works_path: env::var("COHORT_WORKS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/works.json")),
            projection_path: env::var("COHORT_PROJECTION_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            year_min: parse_var("COHORT_YEAR_MIN", current_year - DEFAULT_WINDOW_YEARS + 1)?,
            year_max: parse_var("COHORT_YEAR_MAX", current_year)?,
            home_country_fallback: env::var("COHORT_HOME_COUNTRY")
                .map(|c| c.trim().to_uppercase())
                .unwrap_or_else(|_| "CA".to_string()),
            mds_iterations: parse_var("COHORT_MDS_ITERATIONS", 150)?,
            mds_seed: parse_var("COHORT_MDS_SEED", 42)?,
        })
    }

    /// The supported year window, ordered.
    pub fn year_bounds(&self) -> YearBounds {
        YearBounds::new(self.year_min, self.year_max)
    }

    /// Check that both required dataset files exist.
    /// Call this before loading anything.
    pub fn require_datasets(&self) -> Result<()> {
        if !self.roster_path.exists() {
            anyhow::bail!(
                "Roster not found at {}\n\
                 Set COHORT_ROSTER_PATH in your .env file.",
                self.roster_path.display()
            );
        }
        if !self.works_path.exists() {
            anyhow::bail!(
                "Publication dataset not found at {}\n\
                 Set COHORT_WORKS_PATH in your .env file.",
                self.works_path.display()
            );
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_bounds_are_ordered() {
        let config = Config {
            roster_path: PathBuf::from("r.json"),
            works_path: PathBuf::from("w.json"),
            projection_path: None,
            year_min: 2024,
            year_max: 2020,
            home_country_fallback: "CA".to_string(),
            mds_iterations: 150,
            mds_seed: 42,
        };
        let bounds = config.year_bounds();
        assert_eq!(bounds.min, 2020);
        assert_eq!(bounds.max, 2024);
    }

    #[test]
    fn test_missing_datasets_are_fatal() {
        let config = Config {
            roster_path: PathBuf::from("/nonexistent/roster.json"),
            works_path: PathBuf::from("/nonexistent/works.json"),
            projection_path: None,
            year_min: 2020,
            year_max: 2024,
            home_country_fallback: "CA".to_string(),
            mds_iterations: 150,
            mds_seed: 42,
        };
        let err = config.require_datasets().unwrap_err();
        assert!(err.to_string().contains("Roster not found"));
    }
}
