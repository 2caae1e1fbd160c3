use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use cohortlens::config::Config;
use cohortlens::filter::FilterSnapshot;
use cohortlens::output::{json, terminal};
use cohortlens::pipeline::{Analysis, Settings};
use cohortlens::records::Dataset;

/// Cohortlens: collaboration and topic analytics for a research cohort.
///
/// Loads the roster and publication files, applies the filters, and runs
/// one full analysis cycle per invocation.
#[derive(Parser)]
#[command(name = "cohortlens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    filters: FilterArgs,

    /// Derive the per-author projection from the works file when none is configured
    #[arg(long, global = true)]
    derive_projection: bool,
}

/// Filters shared by every analysis command.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// First publication year (clamped to the supported window)
    #[arg(long, global = true)]
    from: Option<i32>,

    /// Last publication year (clamped to the supported window)
    #[arg(long, global = true)]
    to: Option<i32>,

    /// Topic query; every word must match
    #[arg(long, global = true)]
    query: Option<String>,

    /// Academic level (repeatable)
    #[arg(long, global = true)]
    level: Vec<String>,

    /// Faculty category (repeatable)
    #[arg(long, global = true)]
    category: Vec<String>,

    /// Appointment type (repeatable)
    #[arg(long, global = true)]
    appointment: Vec<String>,

    /// Research group (repeatable)
    #[arg(long, global = true)]
    group: Vec<String>,

    /// Focus on a single author id
    #[arg(long, global = true)]
    author: Option<String>,
}

impl FilterArgs {
    fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            year_from: self.from,
            year_to: self.to,
            query: self.query.clone().unwrap_or_default(),
            levels: self.level.clone(),
            categories: self.category.clone(),
            appointments: self.appointment.clone(),
            groups: self.group.clone(),
            focus: self.author.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show dataset status (files, counts, projection)
    Status,

    /// Show the strongest co-authorship pairs
    Graph {
        /// Number of pairs to show (default: 15)
        #[arg(long, default_value = "15")]
        top: usize,
    },

    /// List the works two members co-authored
    Pair {
        /// First author id
        a: String,
        /// Second author id
        b: String,
    },

    /// Show credited international collaborations per country
    Countries,

    /// List the works crediting one country
    Country {
        /// Country code as it appears in the data (e.g. FR)
        code: String,
    },

    /// Rank partner institutions
    Institutions {
        /// Number of institutions to show (default: 20)
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// List the works crediting one partner institution
    Institution {
        /// Institution id (ROR id without the URL prefix)
        id: String,
    },

    /// Show the topic-similarity map
    Topics,

    /// Run every stage and print or export the result
    Analyze {
        /// Write the full analysis as JSON to this path
        #[arg(long)]
        json: Option<String>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cohortlens=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let dataset = load_dataset(&config, cli.derive_projection)?;

    if let Commands::Status = cli.command {
        cohortlens::status::show(&config, &dataset);
        return Ok(());
    }

    let snapshot = cli.filters.snapshot();
    let analysis = Analysis::compute(&dataset, &snapshot, &Settings::from_config(&config))?;
    terminal::display_selection(&analysis.selection);

    match cli.command {
        Commands::Status => {}

        Commands::Graph { top } => {
            terminal::display_graph(&analysis.selection, &analysis.graph, top);
        }

        Commands::Pair { a, b } => {
            let works = analysis.pair(&a, &b);
            terminal::display_pair(&analysis.selection, &a, &b, works);
        }

        Commands::Countries => {
            terminal::display_countries(&analysis.countries);
        }

        Commands::Country { code } => {
            let rows = analysis.country(&code);
            terminal::display_country_drill_down(&code, &rows);
        }

        Commands::Institutions { top } => {
            terminal::display_institutions(&analysis.institutions, top);
        }

        Commands::Institution { id } => {
            let works = analysis.institution(&id);
            terminal::display_institution_drill_down(&analysis.institutions, &id, &works);
        }

        Commands::Topics => {
            terminal::display_embedding(&analysis.embedding);
        }

        Commands::Analyze { json: Some(path) } => {
            let written = json::write_analysis(&analysis, &path)?;
            info!(path = %written, "Analysis exported");
            println!("\n{}", format!("Analysis saved to: {written}").bold());
        }

        Commands::Analyze { json: None } => {
            terminal::display_graph(&analysis.selection, &analysis.graph, 10);
            terminal::display_countries(&analysis.countries);
            terminal::display_institutions(&analysis.institutions, 10);
            terminal::display_embedding(&analysis.embedding);
        }
    }

    Ok(())
}

/// Load the dataset, deriving the projection on request.
fn load_dataset(config: &Config, derive_projection: bool) -> Result<Dataset> {
    let mut dataset = Dataset::load(config)?;
    if derive_projection {
        dataset.ensure_projection();
    }
    Ok(dataset)
}
