mod commands;

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "pulsecheck-cli")]
#[command(about = "Pulsecheck sentiment monitoring command line interface")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Analyze current sentiment for a subject
    Analyze {
        /// Product or entity name to analyze
        subject: String,

        /// Persist the summary for this owner id
        #[arg(long)]
        owner: Option<Uuid>,

        /// Print the full summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recent trend points for a subject
    Trend {
        /// Product or entity name
        subject: String,

        /// Most recent points to show
        #[arg(long, default_value_t = 30)]
        limit: i64,
    },
    /// Run the monitoring sweep over active subscriptions
    Sweep {
        /// Preview which subscriptions are due without running them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = pulsecheck_core::load_app_config()?;

    let pool_config = pulsecheck_db::PoolConfig::from_app_config(&config);
    let pool = pulsecheck_db::connect_pool(&config.database_url, pool_config).await?;
    pulsecheck_db::run_migrations(&pool).await?;

    let deps = pulsecheck_monitor::pg_deps(pool, &config);

    match cli.command {
        Commands::Analyze {
            subject,
            owner,
            json,
        } => commands::run_analyze(&deps, &subject, owner, json).await,
        Commands::Trend { subject, limit } => commands::run_trend(&deps, &subject, limit).await,
        Commands::Sweep { dry_run } => commands::run_sweep(&deps, dry_run).await,
    }
}
