use std::path::Path;

use clap::Parser;
use trendvision_analytics::{GroupStats, Overview};
use trendvision_core::{AlertConfig, AppConfig, ForecastModel, PostRecord};
use trendvision_ingest::NewsItem;
use trendvision_store::{ForecastFile, PostStore};

use super::*;

fn config_in(dir: &Path) -> AppConfig {
    AppConfig {
        data_dir: dir.to_path_buf(),
        log_level: "info".to_string(),
        bind_addr: "127.0.0.1:8501".parse().unwrap(),
        reddit: None,
        reddit_user_agent: "TrendVision/1.0".to_string(),
        subreddits: vec!["technology".to_string()],
        fetch_limit: 50,
        request_timeout_secs: 5,
        max_retries: 0,
        retry_backoff_base_ms: 0,
        use_transformer: false,
        sentiment_classifier_url: None,
        forecast_model: ForecastModel::Additive,
        forecast_horizon_days: 7,
        alert: AlertConfig {
            bot_token: None,
            channel: "#general".to_string(),
            spike_multiplier: 3.0,
        },
    }
}

fn post(id: &str, created_at: i64) -> PostRecord {
    PostRecord {
        id: id.to_string(),
        title: format!("Rust release {id}"),
        selftext: String::new(),
        author: "poster".to_string(),
        url: String::new(),
        source_group: "rust".to_string(),
        score: 3,
        num_comments: 1,
        created_at,
        keyword: None,
        sentiment: None,
    }
}

#[test]
fn parses_ingest_dry_run() {
    let cli = Cli::try_parse_from(["trendvision", "ingest", "--dry-run"]).expect("valid args");
    assert!(matches!(cli.command, Commands::Ingest { dry_run: true }));
}

#[test]
fn parses_forecast_overrides() {
    let cli = Cli::try_parse_from([
        "trendvision",
        "forecast",
        "--model",
        "fallback",
        "--horizon",
        "14",
    ])
    .expect("valid args");
    assert!(matches!(
        cli.command,
        Commands::Forecast {
            model: Some(ModelArg::Fallback),
            horizon: Some(14)
        }
    ));
    assert_eq!(ForecastModel::from(ModelArg::Fallback), ForecastModel::Fallback);
}

#[test]
fn rejects_zero_horizon_and_unknown_model() {
    assert!(Cli::try_parse_from(["trendvision", "forecast", "--horizon", "0"]).is_err());
    assert!(Cli::try_parse_from(["trendvision", "forecast", "--model", "prophet"]).is_err());
}

#[test]
fn parses_alert_multiplier() {
    let cli = Cli::try_parse_from(["trendvision", "alert", "--multiplier", "2.5"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Alert { multiplier: Some(m) } if (m - 2.5).abs() < f64::EPSILON
    ));
}

#[test]
fn parses_run_and_news() {
    let cli = Cli::try_parse_from(["trendvision", "run", "--skip-ingest"]).unwrap();
    assert!(matches!(cli.command, Commands::Run { skip_ingest: true }));

    let cli = Cli::try_parse_from(["trendvision", "news", "--keyword", "gpu"]).unwrap();
    assert!(matches!(cli.command, Commands::News { keyword: Some(ref k) } if k == "gpu"));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["trendvision"]).is_err());
}

#[test]
fn multiplier_must_be_positive() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    assert!((stages::resolve_multiplier(&config, None).unwrap() - 3.0).abs() < f64::EPSILON);
    assert!(stages::resolve_multiplier(&config, Some(0.0)).is_err());
    assert!(stages::resolve_multiplier(&config, Some(f64::NAN)).is_err());
}

#[test]
fn forecast_command_writes_forecast_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    PostStore::new(config.posts_path())
        .save(&[post("a", 1_704_067_200), post("b", 1_704_153_600)])
        .unwrap();

    stages::run_forecast(&config, Some(ForecastModel::Fallback), Some(3)).unwrap();

    let points = ForecastFile::new(config.forecast_path()).read_or_empty().unwrap();
    assert_eq!(points.len(), 5);
}

#[tokio::test]
async fn enrich_command_requires_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let err = stages::run_enrich(&config).await.unwrap_err();
    assert!(err.to_string().contains("run the upstream stage first"), "{err:#}");
    assert!(!config.posts_path().exists());
}

#[test]
fn summary_of_missing_store_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    report::run_summary(&config_in(dir.path()), false).unwrap();
}

#[test]
fn render_summary_lists_groups() {
    let view = Overview {
        total_posts: 2,
        mean_sentiment: 0.25,
        top_keyword: "rust".to_string(),
        source_groups: 1,
        last_updated: None,
    };
    let groups = vec![GroupStats {
        group: "rust".to_string(),
        count: 2,
        mean_score: 3.0,
        mean_comments: 1.0,
        mean_sentiment: 0.25,
    }];
    let text = report::render_summary(&view, &groups);
    assert!(text.contains("posts:          2"));
    assert!(text.contains("top keyword:    rust"));
    assert!(text.contains("last updated:   never"));
    assert!(text.lines().any(|l| l.starts_with("rust") && l.contains("0.250")));
}

#[test]
fn render_headlines_handles_empty_and_sources() {
    assert_eq!(report::render_headlines("gpu", &[]), "no headlines for 'gpu'\n");

    let items = vec![NewsItem {
        title: "GPU prices fall".to_string(),
        link: "https://example.com/gpu".to_string(),
        published: String::new(),
        source: "Example".to_string(),
    }];
    let text = report::render_headlines("gpu", &items);
    assert!(text.contains("- GPU prices fall (Example)"));
    assert!(text.contains("  https://example.com/gpu"));
}
