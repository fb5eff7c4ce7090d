//! Line-oriented parsing of indexamajig and peak-finding output, and the indexing summary.
//!
//! The summary's second line is `Fractional indexing rate: {rate}`, the same key the elog
//! receives. Older summaries wrote `Fractional indexing rate rate:`; anything matching that
//! text should match on [`RATE_KEY`] instead.

use anyhow::{Context, Result, bail};
use log::warn;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One line per indexed crystal in a CrystFEL stream.
pub const INDEXED_MARKER: &str = "Cell parameters";
/// Peak-finding summary line holding the hit count.
pub const HITS_MARKER: &str = "Number of hits found";

pub const INDEXED_KEY: &str = "Number of indexed events";
pub const RATE_KEY: &str = "Fractional indexing rate";

/// Count lines containing [`INDEXED_MARKER`].
pub fn count_indexed_in<R: BufRead>(reader: R) -> Result<usize> {
    let mut n = 0;
    for line in reader.lines() {
        if line.context("read stream line")?.contains(INDEXED_MARKER) {
            n += 1;
        }
    }
    Ok(n)
}

/// Count indexed patterns in the stream file. A missing stream counts as zero.
pub fn count_indexed(stream: &Path) -> Result<usize> {
    let file = match File::open(stream) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Stream file {} not found; counting 0 indexed", stream.display());
            return Ok(0);
        }
        Err(e) => return Err(e).with_context(|| format!("open stream {}", stream.display())),
    };
    count_indexed_in(BufReader::new(file))
        .with_context(|| format!("scan stream {}", stream.display()))
}

/// Integer after the first colon on the first line containing [`HITS_MARKER`].
pub fn total_hits_in<R: BufRead>(reader: R) -> Result<u64> {
    for line in reader.lines() {
        let line = line.context("read summary line")?;
        if !line.contains(HITS_MARKER) {
            continue;
        }
        let Some((_, value)) = line.split_once(':') else {
            bail!("no value after '{HITS_MARKER}' in line: {line}");
        };
        let value = value.trim();
        return value
            .parse::<u64>()
            .with_context(|| format!("'{HITS_MARKER}' value is not an integer: {value:?}"));
    }
    bail!("no '{HITS_MARKER}' line")
}

/// Total number of hits recorded by peak finding.
pub fn total_hits(peakfinding_summary: &Path) -> Result<u64> {
    let file = File::open(peakfinding_summary)
        .with_context(|| format!("open peakfinding summary {}", peakfinding_summary.display()))?;
    total_hits_in(BufReader::new(file))
        .with_context(|| format!("parse peakfinding summary {}", peakfinding_summary.display()))
}

/// Indexed fraction to two decimals, e.g. `"0.50"`. Zero hits is an error.
pub fn indexing_rate(n_indexed: usize, n_total: u64) -> Result<String> {
    if n_total == 0 {
        bail!("cannot compute indexing rate: peak finding reported 0 hits");
    }
    Ok(format!("{:.2}", n_indexed as f64 / n_total as f64))
}

/// Two-line indexing summary.
pub fn summary_contents(n_indexed: usize, rate: &str) -> String {
    format!("{INDEXED_KEY}: {n_indexed}\n{RATE_KEY}: {rate}\n")
}

pub fn write_summary(path: &Path, n_indexed: usize, rate: &str) -> Result<()> {
    std::fs::write(path, summary_contents(n_indexed, rate))
        .with_context(|| format!("write indexing summary {}", path.display()))
}
