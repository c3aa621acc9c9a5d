mod report;
mod stages;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use trendvision_core::ForecastModel;

#[derive(Debug, Parser)]
#[command(name = "trendvision")]
#[command(about = "TrendVision social-listening pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch hot and new posts from every configured forum and merge them into the store
    Ingest {
        /// Fetch and report without touching the store
        #[arg(long)]
        dry_run: bool,
    },
    /// Tag every stored post with a keyword and sentiment score
    Enrich,
    /// Forecast daily post volume and overwrite the forecast file
    Forecast {
        /// Override the configured forecast model
        #[arg(long, value_enum)]
        model: Option<ModelArg>,

        /// Override the configured horizon in days
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        horizon: Option<u32>,
    },
    /// Check the latest day for a volume spike and send an alert
    Alert {
        /// Override the configured spike multiplier
        #[arg(long)]
        multiplier: Option<f64>,
    },
    /// Run ingest, enrich, forecast, and alert in order
    Run {
        /// Start from the existing store instead of fetching new posts
        #[arg(long)]
        skip_ingest: bool,
    },
    /// Print headline numbers and per-forum statistics
    Summary {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show news headlines for a keyword (defaults to the store's top keyword)
    News {
        /// Keyword to search for
        #[arg(long)]
        keyword: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModelArg {
    Additive,
    Fallback,
}

impl From<ModelArg> for ForecastModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Additive => ForecastModel::Additive,
            ModelArg::Fallback => ForecastModel::Fallback,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = trendvision_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Ingest { dry_run } => stages::run_ingest(&config, dry_run).await,
        Commands::Enrich => stages::run_enrich(&config).await,
        Commands::Forecast { model, horizon } => {
            stages::run_forecast(&config, model.map(Into::into), horizon)
        }
        Commands::Alert { multiplier } => stages::run_alert(&config, multiplier).await,
        Commands::Run { skip_ingest } => stages::run_pipeline(&config, skip_ingest).await,
        Commands::Summary { json } => report::run_summary(&config, json),
        Commands::News { keyword } => report::run_news(&config, keyword.as_deref()).await,
    }
}

#[cfg(test)]
mod tests;
