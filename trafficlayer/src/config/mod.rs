//! User configuration file (`~/.trafficlayer/config.ini`).
//!
//! ```ini
//! [proxy]
//! base_url = http://localhost:6000
//! timeout_secs = 10
//!
//! [traffic]
//! zoom = 11
//! batch_size = 5000
//!
//! [cache]
//! provider = disk
//! directory = ~/.cache/trafficlayer
//!
//! [credential.primary]
//! provider = mapbox
//! token = pk.abc123
//! request_limit = 100000
//!
//! [region.jeddah]
//! north = 21.67
//! south = 21.27
//! east = 39.32
//! west = 39.07
//! ```
//!
//! A missing file yields defaults. Missing keys keep their defaults.

mod defaults;
mod file;
mod parser;
mod settings;
mod size;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheKind, CacheSettings, ConfigFile, CredentialSettings, PrewarmSettings, ProxySettings,
    QuotaSettings,
};
pub use size::{format_size, parse_size, SizeParseError};
