//! Prewarm command - warm congestion tiles for configured regions once.

use tracing::{info, warn};
use trafficlayer::config::{format_size, CacheKind};
use trafficlayer::prewarm::{find_region, Region};

use super::common::CacheChoice;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the prewarm command.
pub struct PrewarmArgs {
    pub region: Option<String>,
    pub zoom: Option<u8>,
    pub cache: Option<CacheChoice>,
}

/// Run the prewarm command.
pub async fn run(args: PrewarmArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("prewarm");

    let cache = args
        .cache
        .map(CacheKind::from)
        .unwrap_or(runner.config().cache.provider);
    if cache == CacheKind::Memory {
        warn!("Memory tile store is discarded on exit; use --cache disk to keep warmed tiles");
    }

    let app = runner.start_app(Some(cache)).await?;
    let zoom = args.zoom.unwrap_or(app.config().prewarm_zoom);
    let regions = select_regions(&app.config().regions, args.region.as_deref())?;

    println!("Warming {} region(s) at zoom {}", regions.len(), zoom);
    let report = app.service().prewarm_regions(&regions, zoom).await;
    runner.save_quota_usage(&app).await?;

    println!();
    println!("Regions warmed: {}", report.regions_warmed.len());
    println!("  Tiles:         {}", report.stats.tiles_requested);
    println!("  Remote:        {}", report.stats.remote_fetches);
    println!("  Cached:        {}", report.stats.cache_hits);
    println!("  Failed:        {}", report.stats.failed);
    if report.stats.store_failures > 0 {
        println!("  Not stored:    {}", report.stats.store_failures);
    }
    println!("  Features:      {}", report.stats.features);
    println!(
        "  Store:         {} ({})",
        app.service().fetcher().store().provider_name(),
        format_size(app.service().fetcher().store().size_bytes() as usize)
    );
    info!(
        warmed = report.regions_warmed.len(),
        failed = report.regions_failed.len(),
        "Prewarm finished"
    );

    if report.is_complete() {
        Ok(())
    } else {
        Err(CliError::PrewarmIncomplete(report.regions_failed))
    }
}

/// All regions, or the single one named by `name`.
fn select_regions(regions: &[Region], name: Option<&str>) -> Result<Vec<Region>, CliError> {
    let Some(name) = name else {
        return Ok(regions.to_vec());
    };

    find_region(regions, name)
        .map(|region| vec![region.clone()])
        .ok_or_else(|| {
            let known: Vec<&str> = regions.iter().map(|r| r.name.as_str()).collect();
            CliError::InvalidArgument(format!(
                "unknown region '{}' (known: {})",
                name,
                known.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trafficlayer::prewarm::default_regions;

    #[test]
    fn test_select_all_regions() {
        let regions = default_regions();
        assert_eq!(select_regions(&regions, None).unwrap(), regions);
    }

    #[test]
    fn test_select_region_by_name() {
        let selected = select_regions(&default_regions(), Some("riyadh")).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "Riyadh");
    }

    #[test]
    fn test_unknown_region_lists_known_names() {
        let err = select_regions(&default_regions(), Some("Atlantis")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Atlantis"));
        assert!(message.contains("Jeddah"));
    }
}
