use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use district_lineage::{
    config::Config,
    dataset::RecordStore,
    lineage::{LineageGraphBuilder, PresentationGraph, PresentationOptions, RelationshipGraph},
    reports::{JsonFormatter, MarkdownFormatter, ReportFormatter, ReportGenerator, TextFormatter},
    types::Report,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "district-lineage")]
#[command(about = "Lineage explorer for the splitting of Chhattisgarh's districts")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset JSON file (overrides the embedded dataset)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Output format (text, markdown, json)
    #[arg(short, long)]
    output: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace the lineage of a district by name or LGD code
    Trace {
        /// District name (case-insensitive) or LGD code
        district: String,
    },

    /// Show overall dataset statistics
    Stats,

    /// Show the remaining-area evolution of a district's family
    Evolution {
        /// District name (case-insensitive) or LGD code
        district: String,
    },

    /// Emit the presentation graph in Graphviz DOT format
    ExportDot {
        /// Output file path (defaults to stdout)
        #[arg(short = 'f', long)]
        output_file: Option<PathBuf>,
    },

    /// Validate the dataset and print graph counts
    Validate,

    /// Initialize configuration file
    Init {
        /// Configuration file path
        #[arg(short = 'f', long, default_value = "district-lineage.yml")]
        config_file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level)?;

    if let Commands::Init { config_file } = &cli.command {
        return init_config(config_file);
    }

    let config = load_config(&cli)?;

    let store = match &config.dataset.source {
        Some(path) => RecordStore::from_json_file(path)?,
        None => RecordStore::load().context("Embedded dataset failed validation")?,
    };

    let options = PresentationOptions {
        junctions: config.presentation.synthesize_junctions,
        remnants: config.presentation.synthesize_remnants,
    };
    let (relationship, presentation) = LineageGraphBuilder::with_options(options)
        .build(&store)
        .context("Failed to build the lineage graphs")?;

    match &cli.command {
        Commands::Trace { district } => {
            let record = store.resolve(district)?;
            let generator = ReportGenerator::new(&store, &relationship);
            let report = Report::Lineage(generator.lineage(record.code)?);
            print_report(&report, &config.output.format)?;
        }

        Commands::Stats => {
            let generator = ReportGenerator::new(&store, &relationship);
            let report = Report::Statistics(generator.statistics()?);
            print_report(&report, &config.output.format)?;
        }

        Commands::Evolution { district } => {
            let record = store.resolve(district)?;
            let generator = ReportGenerator::new(&store, &relationship);
            let report = Report::AreaEvolution(generator.area_evolution(record.code)?);
            print_report(&report, &config.output.format)?;
        }

        Commands::ExportDot { output_file } => {
            export_dot(&presentation, output_file.as_deref())?;
        }

        Commands::Validate => {
            validate(&store, &relationship, &presentation);
        }

        Commands::Init { .. } => unreachable!("handled before dataset load"),
    }

    Ok(())
}

/// Initialize tracing with the specified log level
fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to create env filter")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_level(true))
        .with(env_filter)
        .init();

    Ok(())
}

/// Load configuration, then layer env and CLI overrides on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) if path.exists() => {
            info!("Loading configuration from: {:?}", path);
            Config::load_from_file(path)
                .with_context(|| format!("Failed to load config file: {:?}", path))?
        }
        Some(path) => {
            warn!("Configuration file not found: {:?}. Using defaults.", path);
            Config::default()
        }
        None => Config::default(),
    };

    config.apply_env()?;

    if let Some(dataset) = &cli.dataset {
        config.dataset.source = Some(dataset.clone());
    }
    if let Some(output) = &cli.output {
        config.output.format = output.clone();
    }

    config.validate()?;
    Ok(config)
}

fn print_report(report: &Report, format: &str) -> Result<()> {
    let formatter: Box<dyn ReportFormatter> = match format {
        "json" => Box::new(JsonFormatter),
        "markdown" => Box::new(MarkdownFormatter),
        _ => Box::new(TextFormatter),
    };
    println!("{}", formatter.format(report)?);
    Ok(())
}

fn export_dot(presentation: &PresentationGraph, output_file: Option<&std::path::Path>) -> Result<()> {
    let dot = presentation.to_dot();
    match output_file {
        Some(path) => {
            std::fs::write(path, &dot)
                .with_context(|| format!("Failed to write DOT output to: {:?}", path))?;
            info!("Presentation graph written to: {:?}", path);
        }
        None => print!("{}", dot),
    }
    Ok(())
}

fn validate(
    store: &RecordStore,
    relationship: &RelationshipGraph,
    presentation: &PresentationGraph,
) {
    println!("Dataset OK: {} records", store.len());
    println!(
        "Relationship graph: {} nodes, {} edges",
        relationship.node_count(),
        relationship.edge_count()
    );
    println!(
        "Presentation graph: {} nodes, {} edges ({} junctions, {} remnants)",
        presentation.node_count(),
        presentation.edge_count(),
        presentation.junction_count(),
        presentation.remnant_count()
    );
    println!(
        "Original districts: {:?}",
        relationship.roots()
    );
    println!("Districts never split further: {}", relationship.leaves().len());
}

/// Write a commented default configuration file.
fn init_config(config_file: &PathBuf) -> Result<()> {
    if config_file.exists() {
        anyhow::bail!(
            "Configuration file already exists: {:?}. Remove it first to regenerate.",
            config_file
        );
    }

    let default_config = r#"# district-lineage configuration

# Synthetic nodes added to the presentation graph. The relationship
# graph (and every lineage query) is unaffected by these switches.
presentation:
  synthesize_junctions: true
  synthesize_remnants: true

# Load districts from a JSON file instead of the embedded dataset.
# Rows use the source field shapes: lgd_code, year, district, area,
# parent_lgd (null, a code, or a list of codes).
dataset:
  source: null

# Default output format: text, markdown, or json.
output:
  format: text
"#;

    std::fs::write(config_file, default_config)
        .with_context(|| format!("Failed to write configuration file: {:?}", config_file))?;

    println!("Configuration file created: {:?}", config_file);
    Ok(())
}
