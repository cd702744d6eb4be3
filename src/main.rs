use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use team_classifier::config::AppConfig;
use team_classifier::models::Faction;
use team_classifier::storage::{self, FileFormat};
use team_classifier::{Classifier, WeaponTaxonomy, ZeroKillPolicy};

#[derive(Parser)]
#[command(name = "team-classifier")]
#[command(about = "Infer player factions from post-game weapon kill statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every player in a match statistics file
    Classify {
        /// Input file (.json match document or .jsonl player records)
        #[arg(long)]
        input: PathBuf,

        /// Output file (.json or .jsonl); stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,

        /// Taxonomy file, overriding the config file
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        /// Label zero-kill players the historical way instead of "unknown"
        #[arg(long)]
        legacy_zero_kills: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address (defaults to the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (defaults to the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Inspect weapon taxonomies
    Taxonomy {
        #[command(subcommand)]
        action: TaxonomyAction,
    },
}

#[derive(Subcommand)]
enum TaxonomyAction {
    /// Show version and weapon counts
    Show {
        /// Taxonomy file (defaults to the configured or built-in table)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Validate a taxonomy file
    Check { path: PathBuf },

    /// Look up the faction of a weapon
    Lookup {
        weapon: String,

        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting team-classifier v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Classify {
            input,
            output,
            taxonomy,
            legacy_zero_kills,
        } => {
            let taxonomy_path = taxonomy.or_else(|| config.taxonomy_path.clone());
            let taxonomy = WeaponTaxonomy::load(taxonomy_path.as_deref())
                .context("Failed to load weapon taxonomy")?;

            let mut classifier_config = config.classifier;
            if legacy_zero_kills {
                classifier_config.zero_kills = ZeroKillPolicy::Legacy;
            }
            let classifier = Classifier::new(Arc::new(taxonomy), classifier_config);

            let stats = storage::read_match(&input)
                .with_context(|| format!("Failed to read statistics from {:?}", input))?;
            let result = classifier.classify_match(&stats);

            match &output {
                Some(path) => {
                    storage::write_classified_file(path, &result)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                }
                None => {
                    let format = FileFormat::from_path(&input)?;
                    let mut stdout = std::io::stdout().lock();
                    storage::write_classified(&mut stdout, &result, format)?;
                }
            }

            eprintln!("\n=== Classification ===");
            eprintln!("Players:  {}", result.summary.total());
            eprintln!("Axis:     {}", result.summary.axis);
            eprintln!("Allies:   {}", result.summary.allies);
            eprintln!("Mixed:    {}", result.summary.mixed);
            eprintln!("Unknown:  {}", result.summary.unknown);
            eprintln!("Taxonomy: {}", result.taxonomy_version);
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let taxonomy = WeaponTaxonomy::load(config.taxonomy_path.as_deref())
                .context("Failed to load weapon taxonomy")?;
            let classifier = Classifier::new(Arc::new(taxonomy), config.classifier);

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = team_classifier::api::state::AppState::new(config, classifier);
            let app = team_classifier::api::build_router(state);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Taxonomy { action } => match action {
            TaxonomyAction::Show { path } => {
                let path = path.or_else(|| config.taxonomy_path.clone());
                let taxonomy = WeaponTaxonomy::load(path.as_deref())?;

                println!("Version: {}", taxonomy.version());
                println!(
                    "Weapons: {} (axis {}, allies {})",
                    taxonomy.len(),
                    taxonomy.count(Faction::Axis),
                    taxonomy.count(Faction::Allies)
                );
                for group in taxonomy.groups() {
                    println!(
                        "  {:<16} {:<7} infantry {:>3}  vehicles {:>3}",
                        group.nation,
                        group.faction.to_string(),
                        group.infantry.len(),
                        group.vehicles.len()
                    );
                }
            }
            TaxonomyAction::Check { path } => {
                let taxonomy = WeaponTaxonomy::from_file(&path)
                    .with_context(|| format!("Invalid taxonomy {:?}", path))?;
                println!(
                    "OK: {} weapons, version {}",
                    taxonomy.len(),
                    taxonomy.version()
                );
            }
            TaxonomyAction::Lookup { weapon, path } => {
                let path = path.or_else(|| config.taxonomy_path.clone());
                let taxonomy = WeaponTaxonomy::load(path.as_deref())?;
                match taxonomy.lookup(&weapon) {
                    Some(entry) => println!(
                        "{}: {} ({}, {:?})",
                        weapon, entry.faction, entry.nation, entry.kind
                    ),
                    None => println!("{}: unrecognized", weapon),
                }
            }
        },
    }

    Ok(())
}
