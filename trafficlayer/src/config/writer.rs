//! INI serialization: `ConfigFile` → commented INI string.

use std::fmt::Write as _;
use std::path::Path;

use super::settings::ConfigFile;
use super::size::format_size;

/// Renders `config` as the commented INI written to `config.ini`.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let traffic = &config.traffic;
    let mut out = format!(
        r#"[proxy]
; Base URL of the decode proxy serving raw congestion tiles
base_url = {}
; HTTP timeout in seconds
timeout_secs = {}

[traffic]
; Tile zoom level used for route adjustment (0-18)
zoom = {}
; Maximum tiles per axis in one quota batch
batch_size = {}
; Larger areas are clamped around their center to this many tiles
max_tiles_wide = {}
max_tiles_high = {}
; Timeout in seconds for a single tile fetch
tile_timeout_secs = {}
; Fixed allowance added to every adjusted route, in seconds
buffer_secs = {}
; Route simplification grid and tolerance, in degrees
simplify_grid = {}
simplify_tolerance = {}

[cache]
; Tile store: memory or disk
provider = {}
; Root directory for the disk store
directory = {}
; Capacity of the memory store (KB, MB, GB suffixes)
memory_size = {}

[prewarm]
; Seconds between pre-warm runs of the configured regions
interval_secs = {}
zoom = {}

[quota]
; Day of month on which request counters are reset
reset_day = {}
; Seconds between reset checks
interval_secs = {}
"#,
        config.proxy.base_url,
        config.proxy.timeout_secs,
        traffic.zoom,
        traffic.batch_size,
        traffic.envelope.max_wide,
        traffic.envelope.max_high,
        traffic.tile_timeout.as_secs(),
        traffic.buffer_secs,
        traffic.simplify_grid,
        traffic.simplify_tolerance,
        config.cache.provider.as_str(),
        path_to_string(&config.cache.directory),
        format_size(config.cache.memory_size),
        config.prewarm.interval_secs,
        config.prewarm.zoom,
        config.quota.reset_day,
        config.quota.interval_secs,
    );

    if config.credentials.is_empty() {
        out.push_str(
            r#"
; Provider credentials, one section each:
; [credential.primary]
; provider = mapbox
; token = pk.your-token
; request_limit = 100000
"#,
        );
    }
    for credential in &config.credentials {
        let _ = write!(
            out,
            "\n[credential.{}]\nprovider = {}\ntoken = {}\nrequest_limit = {}\nrequest_count = {}\n",
            credential.name,
            credential.provider,
            credential.token,
            credential.request_limit,
            credential.request_count
        );
    }

    if config.regions.is_empty() {
        out.push_str("\n; Pre-warm regions. Without any, the built-in city list is used.\n");
    }
    for region in &config.regions {
        let _ = write!(
            out,
            "\n[region.{}]\nnorth = {}\nsouth = {}\neast = {}\nwest = {}\n",
            region.name, region.bbox.north, region.bbox.south, region.bbox.east, region.bbox.west
        );
    }

    out
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheKind, CredentialSettings};
    use crate::coord::BoundingBox;
    use crate::prewarm::Region;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_has_all_sections() {
        let content = to_config_string(&ConfigFile::default());
        for section in ["[proxy]", "[traffic]", "[cache]", "[prewarm]", "[quota]"] {
            assert!(content.contains(section), "missing {section}");
        }
        assert!(content.contains("memory_size = 256MB"));
        assert!(content.contains("simplify_grid = 0.00001"));
    }

    #[test]
    fn test_saved_config_loads_back() {
        let mut config = ConfigFile::default();
        config.cache.provider = CacheKind::Disk;
        config.cache.directory = "/srv/tiles".into();
        config.credentials.push(CredentialSettings {
            name: "primary".into(),
            provider: "mapbox".into(),
            token: "pk.abc".into(),
            request_limit: 1000,
            request_count: 7,
        });
        config.regions.push(Region::new(
            "khobar",
            BoundingBox::new(26.30, 26.20, 50.20, 50.10).unwrap(),
        ));

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        config.save_to(&path).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }
}
