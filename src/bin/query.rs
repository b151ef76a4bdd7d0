// Movie Graph - command line query runner
// Run with: cargo run --bin movie-graph -- --query '{ movies { id title } }'

//! # Movie Graph CLI
//!
//! Seeds a fresh catalog, executes one GraphQL document against it and prints
//! the JSON response.
//!
//! ## Usage Examples
//!
//! ```text
//! movie-graph --instant --query '{ movie(movieId: 80117715) { title tags { name } } }'
//! movie-graph --file add.graphql --variables '{"id": "80117715"}' --operation-name AddTag
//! movie-graph --print-schema
//! ```
//!
//! Logging goes to stderr; `RUST_LOG` overrides the configured filter.

use anyhow::{bail, Context};
use clap::Parser;
use dotenv::dotenv;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use movie_graph::{EngineConfig, LatencyConfig, MovieGraph};

#[derive(Parser)]
#[command(name = "movie-graph")]
#[command(about = "Run GraphQL queries and mutations against the in-memory movie catalog")]
#[command(version = "0.1")]
struct Cli {
    /// GraphQL document to execute
    #[arg(short, long, conflicts_with = "file")]
    query: Option<String>,

    /// Read the GraphQL document from a file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Variables as a JSON object
    #[arg(long)]
    variables: Option<String>,

    /// Operation to run when the document has several
    #[arg(long)]
    operation_name: Option<String>,

    /// Configuration file (toml, yaml or json)
    #[arg(short, long, env = "MOVIE_GRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Disable simulated latency
    #[arg(long)]
    instant: bool,

    /// Print the schema in SDL and exit
    #[arg(long)]
    print_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenv().ok();

    let cli = Cli::parse();

    let mut config = EngineConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if cli.instant {
        config.latency = LatencyConfig {
            read_delay_ms: 0,
            write_delay_ms: 0,
            jitter_ms: 0,
        };
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let graph = MovieGraph::new(config.clone())?;

    if cli.print_schema {
        print!("{}", graph.schema().to_sdl());
        return Ok(());
    }

    let source = match (cli.query, cli.file) {
        (Some(query), _) => query,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => bail!("either --query or --file is required"),
    };

    let variables: Option<Map<String, Value>> = match cli.variables {
        Some(raw) => Some(serde_json::from_str(&raw).context("--variables must be a JSON object")?),
        None => None,
    };

    info!(
        read_delay_ms = config.latency.read_delay_ms,
        write_delay_ms = config.latency.write_delay_ms,
        "executing document"
    );
    let response = graph
        .execute_document(&source, variables.as_ref(), cli.operation_name.as_deref())
        .await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
