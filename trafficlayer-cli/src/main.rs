//! TrafficLayer CLI - Command-line interface
//!
//! This binary provides a command-line interface to the TrafficLayer library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use trafficlayer::config::config_file_path;

use commands::adjust::AdjustArgs;
use commands::common::CacheChoice;
use commands::prewarm::PrewarmArgs;
use commands::tiles::TilesArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "trafficlayer")]
#[command(version)]
#[command(about = "Traffic-congestion-adjusted travel times for routing-engine responses", long_about = None)]
struct Cli {
    /// Config file (default: ~/.trafficlayer/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with default settings
    Init {
        /// Replace an existing config file that cannot be read
        #[arg(long)]
        force: bool,
    },

    /// Show the tile range and fetch batches for a bounding box
    Tiles {
        /// Northern edge in degrees
        #[arg(long, allow_hyphen_values = true)]
        north: f64,

        /// Southern edge in degrees
        #[arg(long, allow_hyphen_values = true)]
        south: f64,

        /// Eastern edge in degrees
        #[arg(long, allow_hyphen_values = true)]
        east: f64,

        /// Western edge in degrees
        #[arg(long, allow_hyphen_values = true)]
        west: f64,

        /// Tile zoom level (default from config)
        #[arg(long)]
        zoom: Option<u8>,

        /// Tiles per batch axis (default from config)
        #[arg(long)]
        batch_size: Option<u32>,
    },

    /// Add a traffic duration to the first route of an OSRM response
    Adjust {
        /// Routing-engine response JSON file
        #[arg(long, value_name = "FILE")]
        route: PathBuf,

        /// Tile zoom level (default from config)
        #[arg(long)]
        zoom: Option<u8>,

        /// Skip congestion lookup; traffic duration equals duration
        #[arg(long)]
        no_traffic: bool,

        /// Tile store override
        #[arg(long, value_enum)]
        cache: Option<CacheChoice>,
    },

    /// Warm congestion tiles for the configured regions once
    Prewarm {
        /// Only warm the named region
        #[arg(long)]
        region: Option<String>,

        /// Tile zoom level (default from config)
        #[arg(long)]
        zoom: Option<u8>,

        /// Tile store override
        #[arg(long, value_enum)]
        cache: Option<CacheChoice>,
    },

    /// Run the prewarm and quota reset jobs until Ctrl+C
    Schedule {
        /// Tile store override
        #[arg(long, value_enum)]
        cache: Option<CacheChoice>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config_file_path);
            commands::init::run(&path, force)
        }

        Commands::Tiles {
            north,
            south,
            east,
            west,
            zoom,
            batch_size,
        } => {
            let path = cli.config.unwrap_or_else(config_file_path);
            commands::tiles::run(
                TilesArgs {
                    north,
                    south,
                    east,
                    west,
                    zoom,
                    batch_size,
                },
                &path,
            )
        }

        Commands::Adjust {
            route,
            zoom,
            no_traffic,
            cache,
        } => {
            let runner = CliRunner::new(cli.config)?;
            commands::adjust::run(
                AdjustArgs {
                    route,
                    zoom,
                    no_traffic,
                    cache,
                },
                &runner,
            )
            .await
        }

        Commands::Prewarm {
            region,
            zoom,
            cache,
        } => {
            let runner = CliRunner::new(cli.config)?;
            commands::prewarm::run(
                PrewarmArgs {
                    region,
                    zoom,
                    cache,
                },
                &runner,
            )
            .await
        }

        Commands::Schedule { cache } => {
            let runner = CliRunner::new(cli.config)?;
            commands::schedule::run(cache, &runner).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tiles_with_negative_edges() {
        let cli = Cli::try_parse_from([
            "trafficlayer",
            "tiles",
            "--north",
            "-33.80",
            "--south",
            "-34.00",
            "--east",
            "151.30",
            "--west",
            "151.10",
        ])
        .unwrap();

        match cli.command {
            Commands::Tiles { north, south, .. } => {
                assert_eq!(north, -33.80);
                assert_eq!(south, -34.00);
            }
            _ => panic!("expected tiles command"),
        }
    }

    #[test]
    fn test_parse_adjust() {
        let cli = Cli::try_parse_from([
            "trafficlayer",
            "--config",
            "/tmp/config.ini",
            "adjust",
            "--route",
            "route.json",
            "--no-traffic",
            "--cache",
            "disk",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.ini")));
        match cli.command {
            Commands::Adjust {
                route,
                no_traffic,
                cache,
                ..
            } => {
                assert_eq!(route, PathBuf::from("route.json"));
                assert!(no_traffic);
                assert_eq!(cache, Some(CacheChoice::Disk));
            }
            _ => panic!("expected adjust command"),
        }
    }
}
