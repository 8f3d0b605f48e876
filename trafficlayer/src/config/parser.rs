//! INI parsing: `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::{CacheKind, ConfigFile, CredentialSettings};
use super::size::parse_size;
use crate::coord::{BoundingBox, TileEnvelope, MAX_ZOOM};
use crate::prewarm::Region;

const CREDENTIAL_PREFIX: &str = "credential.";
const REGION_PREFIX: &str = "region.";

/// Parses an `Ini` into a `ConfigFile`, starting from defaults.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [proxy] section
    if let Some(section) = ini.section(Some("proxy")) {
        if let Some(v) = section.get("base_url") {
            let v = v.trim();
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid("proxy", "base_url", v, "must be an http:// or https:// URL"));
            }
            config.proxy.base_url = v.to_string();
        }
        if let Some(v) = section.get("timeout_secs") {
            config.proxy.timeout_secs = parse_positive("proxy", "timeout_secs", v)?;
        }
    }

    // [traffic] section
    if let Some(section) = ini.section(Some("traffic")) {
        let traffic = &mut config.traffic;
        if let Some(v) = section.get("zoom") {
            traffic.zoom = parse_zoom("traffic", v)?;
        }
        if let Some(v) = section.get("batch_size") {
            traffic.batch_size = parse_positive("traffic", "batch_size", v)?;
        }
        let mut wide = traffic.envelope.max_wide;
        let mut high = traffic.envelope.max_high;
        if let Some(v) = section.get("max_tiles_wide") {
            wide = parse_positive("traffic", "max_tiles_wide", v)?;
        }
        if let Some(v) = section.get("max_tiles_high") {
            high = parse_positive("traffic", "max_tiles_high", v)?;
        }
        traffic.envelope = TileEnvelope::new(wide, high);
        if let Some(v) = section.get("tile_timeout_secs") {
            traffic.tile_timeout =
                Duration::from_secs(parse_positive("traffic", "tile_timeout_secs", v)?);
        }
        if let Some(v) = section.get("buffer_secs") {
            traffic.buffer_secs = parse_non_negative("traffic", "buffer_secs", v)?;
        }
        if let Some(v) = section.get("simplify_grid") {
            traffic.simplify_grid = parse_non_negative("traffic", "simplify_grid", v)?;
        }
        if let Some(v) = section.get("simplify_tolerance") {
            traffic.simplify_tolerance = parse_non_negative("traffic", "simplify_tolerance", v)?;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("provider") {
            config.cache.provider = match v.trim().to_lowercase().as_str() {
                "memory" => CacheKind::Memory,
                "disk" => CacheKind::Disk,
                _ => return Err(invalid("cache", "provider", v, "must be 'memory' or 'disk'")),
            };
        }
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("memory_size") {
            config.cache.memory_size = parse_size(v).map_err(|_| {
                invalid(
                    "cache",
                    "memory_size",
                    v,
                    "expected format like '256MB', '1GB', or '512KB'",
                )
            })?;
        }
    }

    // [prewarm] section
    if let Some(section) = ini.section(Some("prewarm")) {
        if let Some(v) = section.get("interval_secs") {
            config.prewarm.interval_secs = parse_positive("prewarm", "interval_secs", v)?;
        }
        if let Some(v) = section.get("zoom") {
            config.prewarm.zoom = parse_zoom("prewarm", v)?;
        }
    }

    // [quota] section
    if let Some(section) = ini.section(Some("quota")) {
        if let Some(v) = section.get("reset_day") {
            let day: u32 = parse_number("quota", "reset_day", v, "must be a day of month (1-31)")?;
            if !(1..=31).contains(&day) {
                return Err(invalid("quota", "reset_day", v, "must be a day of month (1-31)"));
            }
            config.quota.reset_day = day;
        }
        if let Some(v) = section.get("interval_secs") {
            config.quota.interval_secs = parse_positive("quota", "interval_secs", v)?;
        }
    }

    // [credential.*] and [region.*] sections, in file order
    for (name, section) in ini.iter() {
        let Some(name) = name else { continue };
        if let Some(suffix) = name.strip_prefix(CREDENTIAL_PREFIX) {
            config.credentials.push(parse_credential(name, suffix, section)?);
        } else if let Some(suffix) = name.strip_prefix(REGION_PREFIX) {
            config.regions.push(parse_region(name, suffix, section)?);
        }
    }

    Ok(config)
}

fn parse_credential(
    section_name: &str,
    name: &str,
    section: &Properties,
) -> Result<CredentialSettings, ConfigFileError> {
    let token = required(section_name, section, "token")?.trim();
    if token.is_empty() {
        return Err(invalid(section_name, "token", token, "must not be empty"));
    }
    let request_limit = parse_number(
        section_name,
        "request_limit",
        required(section_name, section, "request_limit")?,
        "must be a non-negative integer",
    )?;
    let request_count = match section.get("request_count") {
        Some(v) => parse_number(section_name, "request_count", v, "must be a non-negative integer")?,
        None => 0,
    };

    Ok(CredentialSettings {
        name: name.to_string(),
        provider: section
            .get("provider")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "mapbox".to_string()),
        token: token.to_string(),
        request_limit,
        request_count,
    })
}

fn parse_region(
    section_name: &str,
    name: &str,
    section: &Properties,
) -> Result<Region, ConfigFileError> {
    let edge = |key: &str| -> Result<f64, ConfigFileError> {
        parse_number(
            section_name,
            key,
            required(section_name, section, key)?,
            "must be a number (degrees)",
        )
    };
    let north = edge("north")?;
    let south = edge("south")?;
    let east = edge("east")?;
    let west = edge("west")?;

    let bbox = BoundingBox::new(north, south, east, west).map_err(|e| {
        invalid(
            section_name,
            "north",
            &north.to_string(),
            &e.to_string(),
        )
    })?;
    Ok(Region::new(name, bbox))
}

fn required<'a>(
    section_name: &str,
    section: &'a Properties,
    key: &str,
) -> Result<&'a str, ConfigFileError> {
    section
        .get(key)
        .ok_or_else(|| invalid(section_name, key, "", "is required"))
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_positive<T: FromStr + Default + PartialOrd>(
    section: &str,
    key: &str,
    value: &str,
) -> Result<T, ConfigFileError> {
    let reason = "must be a positive integer";
    let parsed: T = parse_number(section, key, value, reason)?;
    if parsed <= T::default() {
        return Err(invalid(section, key, value, reason));
    }
    Ok(parsed)
}

fn parse_non_negative(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let reason = "must be a non-negative number";
    let parsed: f64 = parse_number(section, key, value, reason)?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(invalid(section, key, value, reason));
    }
    Ok(parsed)
}

fn parse_zoom(section: &str, value: &str) -> Result<u8, ConfigFileError> {
    let reason = format!("must be a zoom level (0-{})", MAX_ZOOM);
    let zoom: u8 = parse_number(section, "zoom", value, &reason)?;
    if zoom > MAX_ZOOM {
        return Err(invalid(section, "zoom", value, &reason));
    }
    Ok(zoom)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        ConfigFile::load_from(file.path())
    }

    fn invalid_key(err: ConfigFileError) -> (String, String) {
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => (section, key),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_full_config() {
        let config = load(
            r#"
[proxy]
base_url = http://decode.internal:7000
timeout_secs = 5

[traffic]
zoom = 12
batch_size = 100
max_tiles_wide = 10
max_tiles_high = 20
tile_timeout_secs = 3
buffer_secs = 30
simplify_grid = 0.0001
simplify_tolerance = 0.001

[cache]
provider = disk
directory = /var/cache/traffic
memory_size = 64MB

[prewarm]
interval_secs = 600
zoom = 10

[quota]
reset_day = 15
interval_secs = 3600

[credential.primary]
provider = mapbox
token = pk.one
request_limit = 1000
request_count = 10

[credential.backup]
token = pk.two
request_limit = 500

[region.jeddah]
north = 21.67
south = 21.27
east = 39.32
west = 39.07
"#,
        )
        .unwrap();

        assert_eq!(config.proxy.base_url, "http://decode.internal:7000");
        assert_eq!(config.proxy.timeout_secs, 5);
        assert_eq!(config.traffic.zoom, 12);
        assert_eq!(config.traffic.batch_size, 100);
        assert_eq!(config.traffic.envelope, TileEnvelope::new(10, 20));
        assert_eq!(config.traffic.tile_timeout, Duration::from_secs(3));
        assert_eq!(config.traffic.buffer_secs, 30.0);
        assert_eq!(config.cache.provider, CacheKind::Disk);
        assert_eq!(config.cache.directory, PathBuf::from("/var/cache/traffic"));
        assert_eq!(config.cache.memory_size, 64 * 1024 * 1024);
        assert_eq!(config.prewarm.interval_secs, 600);
        assert_eq!(config.prewarm.zoom, 10);
        assert_eq!(config.quota.reset_day, 15);

        assert_eq!(config.credentials.len(), 2);
        assert_eq!(config.credentials[0].name, "primary");
        assert_eq!(config.credentials[0].request_count, 10);
        assert_eq!(config.credentials[1].provider, "mapbox");
        assert_eq!(config.credentials[1].request_count, 0);

        assert_eq!(config.regions.len(), 1);
        assert_eq!(config.regions[0].name, "jeddah");
        assert_eq!(config.regions[0].bbox.north, 21.67);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = load("[traffic]\nzoom = 10\n").unwrap();
        assert_eq!(config.traffic.zoom, 10);
        assert_eq!(config.traffic.batch_size, crate::traffic::DEFAULT_BATCH_SIZE);
        assert_eq!(config.proxy.timeout_secs, DEFAULT_PROXY_TIMEOUT_SECS);
        assert_eq!(config.prewarm.interval_secs, DEFAULT_PREWARM_INTERVAL_SECS);
    }

    #[test]
    fn test_invalid_values_name_section_and_key() {
        let cases = [
            ("[traffic]\nzoom = 25\n", "traffic", "zoom"),
            ("[traffic]\nbatch_size = 0\n", "traffic", "batch_size"),
            ("[traffic]\nbuffer_secs = -1\n", "traffic", "buffer_secs"),
            ("[proxy]\nbase_url = localhost:6000\n", "proxy", "base_url"),
            ("[cache]\nprovider = redis\n", "cache", "provider"),
            ("[cache]\nmemory_size = huge\n", "cache", "memory_size"),
            ("[quota]\nreset_day = 32\n", "quota", "reset_day"),
            ("[credential.a]\ntoken = x\n", "credential.a", "request_limit"),
            ("[credential.a]\ntoken = \nrequest_limit = 1\n", "credential.a", "token"),
            ("[region.r]\nnorth = 1\nsouth = 0\neast = x\nwest = 0\n", "region.r", "east"),
        ];

        for (content, section, key) in cases {
            let err = load(content).unwrap_err();
            assert_eq!(invalid_key(err), (section.to_string(), key.to_string()), "{content}");
        }
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/tiles"), home.join("tiles"));
        }
    }
}
