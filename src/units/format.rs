// Display helpers for raw byte counts and used/total pairs. These are the
// leaves of the crate: no dependencies, no state.

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB", "EB"];

#[derive(Debug, PartialEq)]
pub enum Error {
    // negative or non-finite byte count; refusing to render NaN
    InvalidInput(f64),
}

type Result<T> = std::result::Result<T, Error>;

/// Renders a byte count against the 1024-based unit scale, keeping at most
/// `decimals` fractional digits and trimming trailing zeros.
///
/// Values past the end of the unit table are rendered in the largest unit
/// rather than indexing out of range.
pub fn format_bytes(bytes: f64, decimals: usize) -> Result<String> {
    if !bytes.is_finite() || bytes < 0.0 {
        return Err(Error::InvalidInput(bytes));
    }
    if bytes == 0.0 {
        return Ok("0 B".to_string());
    }

    let exp = (bytes.ln() / 1024f64.ln()).floor() as i32;
    let exp = exp.clamp(0, UNITS.len() as i32 - 1);
    let value = bytes / 1024f64.powi(exp);

    let mut repr = format!("{:.*}", decimals, value);
    if repr.contains('.') {
        repr = repr.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    Ok(format!("{} {}", repr, UNITS[exp as usize]))
}

/// Renders `used` out of `total` as a rounded integer percentage. A zero on
/// either side short-circuits to `"0%"`, which doubles as the division guard.
pub fn format_resource_usage(used: u64, total: u64) -> String {
    if used == 0 || total == 0 {
        return "0%".to_string();
    }
    let pct = (used as f64 / total as f64 * 100.0).round();
    format!("{}%", pct as u64)
}
