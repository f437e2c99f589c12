use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use log::debug;

use super::LineStats;
use crate::error::LineProfError;

/// Writes `stats` to `file_path` as pretty-printed JSON, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn dump_stats<P: AsRef<Path>>(stats: &LineStats, file_path: P) -> Result<(), LineProfError> {
    let json = serde_json::to_string_pretty(stats)?;

    let mut file = File::create(file_path.as_ref())?;
    file.write_all(json.as_bytes())?;
    debug!(
        "wrote line stats for {} functions to {}",
        stats.functions.len(),
        file_path.as_ref().display()
    );
    Ok(())
}

/// Reads stats previously written by [`dump_stats`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or does not hold line stats.
pub fn load_stats<P: AsRef<Path>>(file_path: P) -> Result<LineStats, LineProfError> {
    let file = File::open(file_path.as_ref())?;
    let stats: LineStats = serde_json::from_reader(BufReader::new(file))?;
    if !(stats.unit.is_finite() && stats.unit > 0.0) {
        return Err(format!(
            "{} has an invalid timer unit {}",
            file_path.as_ref().display(),
            stats.unit
        )
        .into());
    }
    Ok(stats)
}
