use clap::{Parser, Subcommand};
use gamecat_dedup::{DedupEngine, SimilarityPolicy};
use tracing_subscriber::EnvFilter;

mod db;
mod dedup;

#[derive(Debug, Parser)]
#[command(name = "gamecat")]
#[command(about = "Game catalog maintenance: schema and duplicate merging")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Duplicate product detection and merging
    Dedup {
        #[command(subcommand)]
        command: DedupCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending schema migrations
    Migrate,
}

#[derive(Debug, Subcommand)]
enum DedupCommands {
    /// Run one deduplication pass over the whole catalog
    Run {
        /// Plan merges and print them without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
        /// Override the configured fuzzy title threshold (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = gamecat_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = gamecat_db::PoolConfig::from_app_config(&config);
    let pool = gamecat_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Db { command } => match command {
            DbCommands::Ping => db::run_ping(&pool).await?,
            DbCommands::Migrate => db::run_migrate(&pool).await?,
        },
        Commands::Dedup { command } => match command {
            DedupCommands::Run {
                dry_run,
                json,
                threshold,
            } => {
                let engine = match threshold {
                    Some(t) => DedupEngine::new(SimilarityPolicy::new(t)),
                    None => DedupEngine::from_app_config(&config),
                };
                dedup::run_dedup(&pool, &engine, dry_run, json).await?;
            }
        },
    }

    pool.close().await;
    Ok(())
}
