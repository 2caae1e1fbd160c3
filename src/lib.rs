// Cohortlens: collaboration and topic analytics for a research cohort
//
// This is the library root. Each module corresponds to one stage of the
// recompute cycle, plus the loader and output around it.

pub mod collab;
pub mod config;
pub mod filter;
pub mod graph;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod status;
pub mod topics;
