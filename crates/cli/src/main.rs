use crate::{env::EnvManager, error::CliError, output::Printer, runner::run_script};
use clap::Parser;
use cluster::{ClusterOptions, MemoryCluster};
use commands::Commands;
use driver::{DriverConfig, Session};
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;
mod runner;

#[derive(Parser, Debug)]
#[command(
    name = "cqlpage",
    version = "0.1.0",
    about = "Run CQL scripts against an in-memory cluster and read results page by page"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            page_size,
            keyspace,
            config,
            env_file,
            nodes,
            json,
        } => {
            let config = load_driver_config(config.as_deref(), env_file.as_deref())?;
            let script = tokio::fs::read_to_string(&file).await?;
            info!(file = %file, nodes, page_size = config.query.page_size, "Running script");

            let cluster = MemoryCluster::with_options(ClusterOptions {
                nodes,
                ..ClusterOptions::default()
            });
            let session = open_session(&cluster, config, keyspace.as_deref()).await?;

            let mut printer = Printer::new(io::stdout().lock(), json);
            run_script(&session, &script, page_size, &mut printer).await?;
            printer.into_inner().flush()?;
        }
        Commands::Bounds { json } => {
            let mut printer = Printer::new(io::stdout().lock(), json);
            printer.bounds()?;
        }
    }

    Ok(())
}

/// Defaults, then the JSON file, then `CQLPAGE_*` variables from the
/// environment and the optional env file.
fn load_driver_config(
    path: Option<&str>,
    env_file: Option<&str>,
) -> Result<DriverConfig, CliError> {
    let base = match path {
        Some(path) => DriverConfig::from_file(path)?,
        None => DriverConfig::default(),
    };

    let mut env = EnvManager::new();
    if let Some(env_file) = env_file {
        env.load_from_file(env_file)?;
    }
    env.driver_config(base)
}

async fn open_session(
    cluster: &MemoryCluster,
    config: DriverConfig,
    keyspace: Option<&str>,
) -> Result<Session, CliError> {
    let session = cluster.session(config);
    if let Some(keyspace) = keyspace {
        session
            .execute(format!(
                "CREATE KEYSPACE IF NOT EXISTS {keyspace} \
                 WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
                cluster.node_count()
            ))
            .await?;
        session.use_keyspace(keyspace).await?;
    }
    Ok(session)
}
