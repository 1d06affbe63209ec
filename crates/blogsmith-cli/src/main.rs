use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod campaigns;
mod check;
mod run;
mod seed;

#[derive(Debug, Parser)]
#[command(name = "blogsmith-cli")]
#[command(about = "Blogsmith command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upsert stores from the YAML stores file into the database.
    Seed,
    /// Inspect campaigns.
    #[command(subcommand)]
    Campaigns(CampaignsCommands),
    /// Run one generation cycle for a single campaign, right now.
    Run {
        /// Campaign public id.
        #[arg(long)]
        campaign: String,
    },
    /// Run one due-campaign sweep, the same pass the server scheduler runs.
    Sweep,
    /// Validate a local HTML file with the article validator and heading analyzer.
    Check {
        /// Path to the HTML file.
        file: PathBuf,
        /// Lower bound of the word-count window.
        #[arg(long, default_value_t = 500)]
        min: i32,
        /// Upper bound of the word-count window.
        #[arg(long, default_value_t = 2000)]
        max: i32,
    },
}

#[derive(Debug, Subcommand)]
enum CampaignsCommands {
    /// List campaigns, optionally narrowed to one store.
    List {
        /// Store slug.
        #[arg(long)]
        store: Option<String>,
        /// Maximum rows to print.
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Seed => {
            let (pool, config) = connect().await?;
            seed::run_seed(&pool, &config).await
        }
        Commands::Campaigns(CampaignsCommands::List { store, limit }) => {
            let (pool, _config) = connect().await?;
            campaigns::run_list(&pool, store.as_deref(), limit).await
        }
        Commands::Run { campaign } => {
            let (pool, config) = connect().await?;
            run::run_one(&pool, &config, &campaign).await
        }
        Commands::Sweep => {
            let (pool, config) = connect().await?;
            run::run_sweep(&pool, &config).await
        }
        Commands::Check { file, min, max } => check::run_check(&file, min, max),
    }
}

/// Load configuration, open the database pool, and apply pending migrations.
async fn connect() -> anyhow::Result<(sqlx::PgPool, blogsmith_core::AppConfig)> {
    let config = blogsmith_core::load_app_config()?;
    let pool_config = blogsmith_db::PoolConfig::from_app_config(&config);
    let pool = blogsmith_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = blogsmith_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }
    Ok((pool, config))
}
