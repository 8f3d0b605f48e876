//! Tiles command - preview the tile range and batches for a bounding box.

use std::path::Path;

use trafficlayer::config::ConfigFile;
use trafficlayer::coord::{batch_tile_range, tile_range, BoundingBox, TileBatch, TileRange};

use super::common::{resolve_batch_size, resolve_zoom};
use crate::error::CliError;

/// Arguments for the tiles command.
pub struct TilesArgs {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub zoom: Option<u8>,
    pub batch_size: Option<u32>,
}

/// Run the tiles command. Makes no network calls.
pub fn run(args: TilesArgs, config_path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(config_path)?;
    let zoom = resolve_zoom(args.zoom, &config);
    let batch_size = resolve_batch_size(args.batch_size, &config)?;

    let (bbox, range, batches) = plan(&args, zoom, batch_size, &config)?;

    println!("Bounding box: {}", format_bbox(&bbox));
    println!("Zoom:         {}", zoom);
    println!(
        "Tiles:        x {}..={}, y {}..={} ({} x {} = {} tiles)",
        range.x_min,
        range.x_max,
        range.y_min,
        range.y_max,
        range.width(),
        range.height(),
        range.tile_count()
    );
    match &range.clamped {
        Some(clamped) => println!(
            "Clamped to:   {} (max {} x {} tiles)",
            format_bbox(clamped),
            config.traffic.envelope.max_wide,
            config.traffic.envelope.max_high
        ),
        None => println!("Clamped:      no"),
    }
    println!();
    println!("Batches of up to {} per axis: {}", batch_size, batches.len());
    for (i, batch) in batches.iter().enumerate() {
        println!("  [{}] {}", i + 1, format_batch(batch));
    }

    Ok(())
}

fn plan(
    args: &TilesArgs,
    zoom: u8,
    batch_size: u32,
    config: &ConfigFile,
) -> Result<(BoundingBox, TileRange, Vec<TileBatch>), CliError> {
    let bbox = BoundingBox::new(args.north, args.south, args.east, args.west)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let range = tile_range(&bbox, zoom, config.traffic.envelope)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let batches = batch_tile_range(&range, batch_size);
    Ok((bbox, range, batches))
}

fn format_bbox(bbox: &BoundingBox) -> String {
    format!(
        "N {:.5} S {:.5} E {:.5} W {:.5}",
        bbox.north, bbox.south, bbox.east, bbox.west
    )
}

fn format_batch(batch: &TileBatch) -> String {
    format!(
        "x {}..={}, y {}..={} ({} tiles)",
        batch.xs.start(),
        batch.xs.end(),
        batch.ys.start(),
        batch.ys.end(),
        batch.tile_count()
    )
}
