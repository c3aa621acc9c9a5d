//! Pipeline stage command handlers.

use anyhow::Context;
use trendvision_analytics::{forecaster_for, SlackNotifier, SpikeMonitor};
use trendvision_core::{AppConfig, ForecastModel};
use trendvision_ingest::IngestConfig;
use trendvision_nlp::Enricher;
use trendvision_store::{ForecastFile, PostStore};

/// Fetch posts from every configured forum and merge them into the store.
///
/// An empty fetch leaves the store untouched. With `dry_run` the fetched
/// posts are counted but never written.
///
/// # Errors
///
/// Returns an error if forum credentials are missing, the token exchange
/// fails, or the store cannot be written. Individual forum failures are
/// logged and skipped.
pub(crate) async fn run_ingest(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let ingest_config = IngestConfig::from_app_config(config)
        .context("set REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET to ingest posts")?;
    let posts = trendvision_ingest::collect_posts(&ingest_config).await?;

    if posts.is_empty() {
        tracing::warn!("no posts fetched; check network access and forum credentials");
        println!("no posts fetched; store left untouched");
        return Ok(());
    }

    if dry_run {
        println!(
            "dry-run: fetched {} unique posts from {} forums; store not modified",
            posts.len(),
            ingest_config.subreddits.len()
        );
        return Ok(());
    }

    let store = PostStore::new(config.posts_path());
    let report = store.merge_and_save(posts)?;
    tracing::info!(
        kept = report.kept,
        added = report.added,
        duplicates = report.duplicates,
        path = %store.path().display(),
        "ingestion merged"
    );
    println!(
        "ingested {} new posts ({} already stored) into {}",
        report.added,
        report.duplicates,
        store.path().display()
    );
    Ok(())
}

/// Tag every stored post with a keyword and sentiment score.
///
/// # Errors
///
/// Returns an error if the store does not exist yet, cannot be read or
/// written, or the classifier client cannot be built.
pub(crate) async fn run_enrich(config: &AppConfig) -> anyhow::Result<()> {
    let store = PostStore::new(config.posts_path());
    let enricher = Enricher::from_app_config(config)?;
    let report = trendvision_nlp::run_enrichment(&store, &enricher).await?;
    println!(
        "enriched {} posts, {} already enriched ({} empty keywords, {} neutral-default sentiments)",
        report.records, report.skipped, report.keyword_defaults, report.sentiment_defaults
    );
    Ok(())
}

/// Forecast daily post volume and overwrite the forecast file.
///
/// # Errors
///
/// Returns an error if the store is missing or empty, or the forecast file
/// cannot be written.
pub(crate) fn run_forecast(
    config: &AppConfig,
    model: Option<ForecastModel>,
    horizon: Option<u32>,
) -> anyhow::Result<()> {
    let store = PostStore::new(config.posts_path());
    let output = ForecastFile::new(config.forecast_path());
    let forecaster = forecaster_for(model.unwrap_or(config.forecast_model));
    let horizon = horizon.unwrap_or(config.forecast_horizon_days);

    let report = trendvision_analytics::run_forecast(&store, &output, forecaster.as_ref(), horizon)?;
    println!(
        "forecast ({}) written to {}: {} points from {} observed days",
        report.model,
        output.path().display(),
        report.points,
        report.observed_dates
    );
    Ok(())
}

/// Check the latest day for a volume spike and deliver an alert.
///
/// # Errors
///
/// Returns an error if `multiplier` is not a positive number or the store
/// does not exist. Delivery failures are logged, not returned.
pub(crate) async fn run_alert(config: &AppConfig, multiplier: Option<f64>) -> anyhow::Result<()> {
    let multiplier = resolve_multiplier(config, multiplier)?;
    let notifier = SlackNotifier::from_config(&config.alert, config.request_timeout_secs)?;
    let monitor = SpikeMonitor::new(multiplier, notifier);
    let store = PostStore::new(config.posts_path());

    match trendvision_analytics::run_spike_check(&store, &monitor).await? {
        Some(alert) => println!("{}", alert.message()),
        None => println!("no spike detected (multiplier {multiplier})"),
    }
    Ok(())
}

pub(crate) fn resolve_multiplier(config: &AppConfig, multiplier: Option<f64>) -> anyhow::Result<f64> {
    let value = multiplier.unwrap_or(config.alert.spike_multiplier);
    if !value.is_finite() || value <= 0.0 {
        anyhow::bail!("spike multiplier must be a positive number, got {value}");
    }
    Ok(value)
}

/// Run every stage in order, stopping at the first fatal error.
///
/// # Errors
///
/// Returns the first stage error; later stages are not run.
pub(crate) async fn run_pipeline(config: &AppConfig, skip_ingest: bool) -> anyhow::Result<()> {
    if skip_ingest {
        tracing::info!("skipping ingestion; using existing store");
    } else {
        run_ingest(config, false).await.context("ingest stage failed")?;
    }
    run_enrich(config).await.context("enrich stage failed")?;
    run_forecast(config, None, None).context("forecast stage failed")?;
    run_alert(config, None).await.context("alert stage failed")?;
    tracing::info!("pipeline complete");
    Ok(())
}

