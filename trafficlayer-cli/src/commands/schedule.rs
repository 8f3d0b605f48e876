//! Schedule command - run the prewarm, quota reset and quota save jobs
//! until Ctrl+C.

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::CacheChoice;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the schedule command.
pub async fn run(cache: Option<CacheChoice>, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("schedule");

    let app = runner.start_app(cache.map(Into::into)).await?;
    let config = app.config();
    let scheduler = app.scheduler_with_quota_file(runner.config_path());

    println!("TrafficLayer Scheduler v{}", trafficlayer::VERSION);
    println!("=============================");
    println!();
    println!(
        "Prewarm:     {} region(s) at zoom {}, every {}s",
        config.regions.len(),
        config.prewarm_zoom,
        config.prewarm_interval.as_secs()
    );
    println!(
        "Quota reset: day {} of the month, checked every {}s",
        config.quota_reset_day,
        config.quota_interval.as_secs()
    );
    println!(
        "Quota save:  {}, every {}s",
        runner.config_path().display(),
        config.prewarm_interval.as_secs()
    );
    println!(
        "Store:       {}",
        app.service().fetcher().store().provider_name()
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let shutdown = CancellationToken::new();
    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        let _drop = ctrl_c_token.drop_guard();
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
        }
    });

    info!(jobs = scheduler.len(), "Scheduler starting");
    scheduler.run(shutdown).await;
    runner.save_quota_usage(&app).await?;

    println!();
    println!("Scheduler stopped.");
    Ok(())
}
