//! Human-readable byte sizes ("256MB", "1GB").

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid size '{input}' - expected format like '256MB', '1GB', or '512KB'")]
pub struct SizeParseError {
    input: String,
}

const KB: usize = 1024;
const MB: usize = 1024 * KB;
const GB: usize = 1024 * MB;

/// Parses a size with an optional `K`/`KB`, `M`/`MB` or `G`/`GB` suffix.
///
/// Case-insensitive; a bare number is bytes.
///
/// ```
/// use trafficlayer::config::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("256mb").unwrap(), 256 * 1024 * 1024);
/// assert_eq!(parse_size("1 GB").unwrap(), 1024 * 1024 * 1024);
/// ```
pub fn parse_size(s: &str) -> Result<usize, SizeParseError> {
    let err = || SizeParseError {
        input: s.to_string(),
    };
    let upper = s.trim().to_ascii_uppercase();
    let without_b = upper.strip_suffix('B').unwrap_or(&upper);

    let (number, multiplier) = if let Some(n) = without_b.strip_suffix('G') {
        (n, GB)
    } else if let Some(n) = without_b.strip_suffix('M') {
        (n, MB)
    } else if let Some(n) = without_b.strip_suffix('K') {
        (n, KB)
    } else {
        (without_b, 1)
    };

    let value: usize = number.trim().parse().map_err(|_| err())?;
    value.checked_mul(multiplier).ok_or_else(err)
}

/// Formats bytes with the largest suffix that divides them exactly.
pub fn format_size(bytes: usize) -> String {
    match bytes {
        0 => "0".to_string(),
        b if b % GB == 0 => format!("{}GB", b / GB),
        b if b % MB == 0 => format!("{}MB", b / MB),
        b if b % KB == 0 => format!("{}KB", b / KB),
        b => b.to_string(),
    }
}
