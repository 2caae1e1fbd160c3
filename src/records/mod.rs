// Records: typed roster/publication data and the loader that produces it.
//
// The roster and the dedup-by-work publication file are required; the
// per-author projection is optional and its absence is never fatal.

pub mod dedup;
pub mod models;
pub mod normalize;
pub mod projection;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::Config;
use models::{ProjectedWork, Publication, Researcher, YearBounds};
use normalize::{RawPublication, RawResearcher};

/// An immutable snapshot of everything loaded for one session.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub roster: Vec<Researcher>,
    pub works: Vec<Publication>,
    pub projection: Option<Vec<ProjectedWork>>,
    pub bounds: YearBounds,
}

impl Dataset {
    pub fn new(
        roster: Vec<Researcher>,
        works: Vec<Publication>,
        projection: Option<Vec<ProjectedWork>>,
        bounds: YearBounds,
    ) -> Self {
        Self {
            roster,
            works,
            projection,
            bounds,
        }
    }

    /// Load the dataset files named in the configuration.
    ///
    /// Fails only when the roster or the publication file is missing or
    /// unreadable. A broken projection file is logged and skipped.
    pub fn load(config: &Config) -> Result<Self> {
        config.require_datasets()?;
        let bounds = config.year_bounds();

        let raw_roster: Vec<RawResearcher> = read_rows(&config.roster_path)?;
        let roster_rows = raw_roster.len();
        let roster: Vec<Researcher> = raw_roster
            .iter()
            .filter_map(normalize::normalize_researcher)
            .collect();
        if roster.len() < roster_rows {
            warn!(
                skipped = roster_rows - roster.len(),
                "Roster rows without an author id were skipped"
            );
        }

        let raw_works: Vec<RawPublication> = read_rows(&config.works_path)?;
        let works: Vec<Publication> = raw_works
            .iter()
            .map(|raw| normalize::normalize_publication(raw, &bounds))
            .collect();
        let works = dedup::merge_by_work(works);

        let projection: Option<Vec<ProjectedWork>> = match &config.projection_path {
            Some(path) => match read_rows::<RawPublication>(path) {
                Ok(rows) => Some(
                    rows.iter()
                        .filter_map(|raw| normalize::normalize_projected(raw, &bounds))
                        .collect(),
                ),
                Err(e) => {
                    warn!(error = %e, "Per-author projection unreadable, using name matching");
                    None
                }
            },
            None => None,
        };

        info!(
            researchers = roster.len(),
            works = works.len(),
            projection_rows = projection.as_ref().map(Vec::len),
            "Dataset loaded"
        );

        Ok(Self::new(roster, works, projection, bounds))
    }

    /// Build the per-author projection from the dedup rows if none was loaded.
    pub fn ensure_projection(&mut self) {
        if self.projection.is_none() {
            let rows = projection::project(&self.works, &self.roster);
            info!(rows = rows.len(), "Derived per-author projection");
            self.projection = Some(rows);
        }
    }

    pub fn researcher(&self, id: &str) -> Option<&Researcher> {
        self.roster.iter().find(|r| r.id == id)
    }

    /// Roster id → name lookup.
    pub fn names(&self) -> HashMap<&str, &str> {
        self.roster
            .iter()
            .map(|r| (r.id.as_str(), r.name.as_str()))
            .collect()
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rows: Vec<T> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {} as a JSON array of rows", path.display()))?;
    Ok(rows)
}
