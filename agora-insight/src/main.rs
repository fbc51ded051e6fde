//! Agora Insight - command-line front end for the analysis core.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use agora_common::config::expand_path;
use agora_common::logging::init_logging;
use agora_insight::demo::{generate_demo_opinions, DEFAULT_DEMO_COUNT};
use agora_insight::report::{render_report, render_scenarios};
use agora_insight::{InsightConfig, InsightEngine, Opinion, ReportEnvelope};

/// Auditable opinion clustering and policy scenario analysis.
#[derive(Parser, Debug)]
#[command(name = "agora-insight")]
#[command(version)]
#[command(about = "Cluster opinions and project policy scenarios into an auditable report.", long_about = None)]
struct Cli {
    /// Configuration directory (default: ~/.agora, or AGORA_CONFIG_DIR)
    #[arg(long, global = true)]
    config_dir: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze opinions from a JSON array file
    Analyze {
        /// Path to the opinions file
        #[arg(short, long)]
        input: String,

        /// Override the clustering seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Analyze seeded synthetic UBI opinions
    Demo {
        /// Number of opinions to generate
        #[arg(short, default_value_t = DEFAULT_DEMO_COUNT)]
        n: usize,

        /// Seed for both data generation and clustering
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Project scenarios and tradeoffs only
    Scenarios,
}

fn read_opinions(path: &Path) -> Result<Vec<Opinion>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse opinions in {}", path.display()))
}

fn emit(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            let path = PathBuf::from(expand_path(path));
            fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = content.len(), "Report written");
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn analyze(engine: &InsightEngine, opinions: &[Opinion], format: OutputFormat) -> Result<String> {
    let report = engine.analyze(opinions)?;
    let envelope = ReportEnvelope::new(&report, Utc::now())?;
    Ok(match format {
        OutputFormat::Json => envelope.to_json()?,
        OutputFormat::Markdown => render_report(&report, &envelope.digest, envelope.generated_at),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = cli.config_dir.as_deref().map(|d| PathBuf::from(expand_path(d)));
    let mut config = match InsightConfig::load(config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    init_logging(&config.observability.log_level, &config.observability.log_format);
    tracing::info!("Agora Insight v{}", env!("CARGO_PKG_VERSION"));

    let content = match cli.command {
        Commands::Analyze { input, seed } => {
            if let Some(seed) = seed {
                config.clustering.seed = seed;
            }
            let opinions = read_opinions(Path::new(&expand_path(&input)))?;
            let engine = InsightEngine::new(config)?;
            analyze(&engine, &opinions, cli.format)?
        }
        Commands::Demo { n, seed } => {
            let seed = seed.unwrap_or(config.clustering.seed);
            config.clustering.seed = seed;
            let opinions = generate_demo_opinions(n, seed);
            let engine = InsightEngine::new(config)?;
            let mut content = analyze(&engine, &opinions, cli.format)?;
            if cli.format == OutputFormat::Markdown {
                content.push_str("\n*Demo mode: synthetic data used for illustration.*\n");
            }
            content
        }
        Commands::Scenarios => {
            let engine = InsightEngine::new(config)?;
            let scenarios = engine.project_scenarios();
            let envelope = ReportEnvelope::new(&scenarios, Utc::now())?;
            match cli.format {
                OutputFormat::Json => envelope.to_json()?,
                OutputFormat::Markdown => render_scenarios(
                    &engine.config().topic,
                    &scenarios,
                    &envelope.digest,
                    envelope.generated_at,
                ),
            }
        }
    };

    emit(cli.output.as_deref(), &content)
}
