//! Progress counters posted to the elog.
//!
//! The elog replaces the run's counters wholesale on each post, so the peak-finding
//! counters are re-sent alongside the indexing ones.

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use super::report::{INDEXED_KEY, RATE_KEY};

/// Number of leading peak-finding summary lines carried into the post.
pub const PEAKFINDING_COUNTERS: usize = 3;

const POST_TIMEOUT: Duration = Duration::from_secs(30);

/// One `{"key": ..., "value": ...}` entry of the counters payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Counter {
    pub key: String,
    pub value: String,
}

impl Counter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// First [`PEAKFINDING_COUNTERS`] lines of the peak-finding summary as key/value pairs.
pub fn parse_peakfinding_counters(text: &str) -> Result<Vec<Counter>> {
    let lines: Vec<&str> = text.lines().take(PEAKFINDING_COUNTERS).collect();
    if lines.len() < PEAKFINDING_COUNTERS {
        bail!(
            "expected {PEAKFINDING_COUNTERS} counter lines, found {}",
            lines.len()
        );
    }
    lines
        .into_iter()
        .map(|line| {
            let (key, value) = line
                .split_once(':')
                .with_context(|| format!("counter line without ':': {line:?}"))?;
            Ok(Counter::new(key, value.trim_matches(' ')))
        })
        .collect()
}

pub fn peakfinding_counters(summary: &Path) -> Result<Vec<Counter>> {
    let text = std::fs::read_to_string(summary)
        .with_context(|| format!("read peakfinding summary {}", summary.display()))?;
    parse_peakfinding_counters(&text)
        .with_context(|| format!("parse peakfinding summary {}", summary.display()))
}

/// Full payload: peak-finding counters, then indexed count and rate.
pub fn counters_payload(peakfinding: Vec<Counter>, n_indexed: usize, rate: &str) -> Vec<Counter> {
    let mut payload = peakfinding;
    payload.push(Counter::new(INDEXED_KEY, n_indexed.to_string()));
    payload.push(Counter::new(RATE_KEY, rate));
    payload
}

/// POST `payload` as JSON. Failures are logged, never returned; returns whether the post succeeded.
pub fn post_counters(url: &str, payload: &[Counter]) -> bool {
    match try_post(url, payload) {
        Ok(()) => {
            debug!("Posted {} counters to {}", payload.len(), url);
            true
        }
        Err(e) => {
            warn!("Could not communicate with the elog update url: {e:#}");
            false
        }
    }
}

fn try_post(url: &str, payload: &[Counter]) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(POST_TIMEOUT)
        .build()
        .context("build http client")?;
    client
        .post(url)
        .json(payload)
        .send()
        .with_context(|| format!("POST {url}"))?
        .error_for_status()
        .context("elog rejected update")?;
    Ok(())
}
