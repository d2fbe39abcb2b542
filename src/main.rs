use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cricket_insights::api::{build_router, AppState};
use cricket_insights::calculate::{clamp_limit, Aggregation, Filter, Query};
use cricket_insights::config::AppConfig;
use cricket_insights::dashboard::{build_report, render_text, require_panel, run_panel, Panel, PanelResult};
use cricket_insights::models::{Column, Source, ValueColumn};
use cricket_insights::storage::load_table;
use cricket_insights::Dataset;

#[derive(Parser)]
#[command(name = "cricket-insights")]
#[command(about = "Season analytics over IPL match and delivery tables")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Match table path (overrides config)
    #[arg(long)]
    matches: Option<PathBuf>,

    /// Delivery table path (overrides config)
    #[arg(long)]
    events: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
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
    /// Compute dashboard panels
    Report {
        /// Only compute this panel
        #[arg(long)]
        panel: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run an ad hoc ranked aggregation
    Query {
        /// Table to aggregate: matches or events
        #[arg(long, default_value = "events")]
        source: Source,

        /// Group key columns (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        group_by: Vec<Column>,

        /// Sum this value column
        #[arg(long, conflicts_with = "count")]
        sum: Option<ValueColumn>,

        /// Count rows
        #[arg(long)]
        count: bool,

        /// Row filter, e.g. `wickets`, `dismissals`, `not_null:winner`, `season=2017`
        #[arg(long)]
        filter: Option<Filter>,

        /// Number of rows to show (defaults to config)
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<i64>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Load, normalize and join the tables, then print a summary
    Validate,

    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Starting cricket-insights v{}", env!("CARGO_PKG_VERSION"));

    let matches_path = cli.matches.clone().unwrap_or_else(|| config.matches_path());
    let events_path = cli.events.clone().unwrap_or_else(|| config.events_path());
    let dataset = load_dataset(&config, &matches_path, &events_path)?;
    let panels = config.panels();

    match cli.command {
        Commands::Report { panel, json } => {
            let results: Vec<PanelResult> = match panel {
                Some(name) => {
                    let panel = require_panel(&panels, &name)?;
                    vec![run_panel(&dataset, panel, None)?]
                }
                None => build_report(&dataset, &panels)?.panels,
            };

            if json {
                let report = serde_json::json!({
                    "summary": dataset.summary(),
                    "panels": results,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for result in &results {
                    println!("{}", render_text(result));
                }
            }
        }
        Commands::Query {
            source,
            group_by,
            sum,
            count,
            filter,
            limit,
            json,
        } => {
            let mut aggregation = match (sum, count) {
                (Some(value), false) => Aggregation::sum(source, group_by, value),
                (None, true) => Aggregation::count(source, group_by),
                _ => anyhow::bail!("Specify exactly one of --sum <COLUMN> or --count"),
            };
            if let Some(filter) = filter {
                aggregation = aggregation.with_filter(filter);
            }

            let limit = limit.map(clamp_limit).unwrap_or(config.default_limit);
            let panel = Panel::new("query", "Query", Query::Ranked { aggregation, limit });
            let result = run_panel(&dataset, &panel, None).context("Query failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result.result)?);
            } else {
                println!("{}", render_text(&result));
            }
        }
        Commands::Validate => {
            let summary = dataset.summary();
            println!("\n=== Dataset Summary ===");
            println!("Matches:          {}", summary.matches);
            println!("Deliveries:       {}", summary.events);
            println!("Unmatched:        {}", summary.unmatched_events);
            println!("Seasons:          {}", summary.seasons);
            println!("Panels:           {}", panels.len());
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let state = AppState::new(dataset, panels);
            let app = build_router(state, &config.server.cors_origin);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Dashboard API: http://{}/api/report", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn load_dataset(config: &AppConfig, matches_path: &Path, events_path: &Path) -> Result<Dataset> {
    let matches = load_table(matches_path).with_context(|| format!("Failed to load matches from {:?}", matches_path))?;
    let events = load_table(events_path).with_context(|| format!("Failed to load deliveries from {:?}", events_path))?;

    let dataset = Dataset::prepare(&matches, &events, &config.alias_table()).context("Failed to prepare dataset")?;
    Ok(dataset)
}
