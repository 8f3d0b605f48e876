//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`init`] - Configuration initialization
//! - [`tiles`] - Tile range and batch preview for a bounding box
//! - [`adjust`] - Traffic-adjust a saved routing-engine response
//! - [`prewarm`] - Warm congestion tiles for configured regions once
//! - [`schedule`] - Run the periodic jobs until interrupted

pub mod adjust;
pub mod common;
pub mod init;
pub mod prewarm;
pub mod schedule;
pub mod tiles;
