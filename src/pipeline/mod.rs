// One full recompute cycle: filter -> graph -> countries -> institutions ->
// embedding.
//
// Every stage reads the same immutable dataset and filter snapshot, and the
// resulting Analysis is the only thing drill-down queries look at. Nothing
// is cached between cycles.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::collab::countries::{self, CountryLinkSeries, CreditedPublication};
use crate::collab::institutions::{self, PartnerInstitutionRanking};
use crate::config::Config;
use crate::filter::{self, FilterSnapshot, Selection};
use crate::graph::{self, CoauthorGraph};
use crate::records::models::Publication;
use crate::records::Dataset;
use crate::topics::mds::ClassicalMds;
use crate::topics::{self, TopicEmbedding};

/// Tunables for a cycle that do not come from the filter snapshot.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Home country when the cohort's own affiliations give no answer
    pub home_country_fallback: String,
    pub mds: ClassicalMds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home_country_fallback: "CA".to_string(),
            mds: ClassicalMds::default(),
        }
    }
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            home_country_fallback: config.home_country_fallback.clone(),
            mds: ClassicalMds::new(config.mds_iterations, config.mds_seed),
        }
    }
}

/// Everything derived from one (dataset, snapshot) pair.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub snapshot: FilterSnapshot,
    pub selection: Selection,
    pub graph: CoauthorGraph,
    pub countries: CountryLinkSeries,
    pub institutions: PartnerInstitutionRanking,
    pub embedding: TopicEmbedding,
}

impl Analysis {
    /// Run every stage in order over the dataset.
    pub fn compute(
        dataset: &Dataset,
        snapshot: &FilterSnapshot,
        settings: &Settings,
    ) -> Result<Self> {
        let selection = filter::apply(dataset, snapshot);
        let graph = graph::build(&selection, dataset.projection.as_deref());
        let countries = countries::classify(&selection, &settings.home_country_fallback);
        let institutions = institutions::rank(&selection);
        let embedding = topics::embed(&selection, &settings.mds)?;

        info!(
            cohort = selection.roster.len(),
            publications = selection.publications.len(),
            edges = graph.edges.len(),
            countries = countries.countries.len(),
            partners = institutions.partners.len(),
            "Analysis cycle complete"
        );

        Ok(Self {
            snapshot: snapshot.clone(),
            selection,
            graph,
            countries,
            institutions,
            embedding,
        })
    }

    /// Works co-authored by two cohort members.
    pub fn pair(&self, a: &str, b: &str) -> &[Publication] {
        self.graph.pair_publications(a.trim(), b.trim())
    }

    /// Works crediting one country, with the cohort authors that triggered it.
    pub fn country(&self, code: &str) -> Vec<CreditedPublication> {
        countries::drill_down(&self.selection, &self.countries.home_country, code)
    }

    /// Works crediting one partner institution.
    pub fn institution(&self, id: &str) -> Vec<Publication> {
        institutions::drill_down(&self.selection, &self.institutions, id)
    }
}
