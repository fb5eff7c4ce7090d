//! Indexing with CrystFEL's indexamajig: write the batch script, then summarize and report the results.

pub mod command;
pub mod elog;
pub mod paths;
pub mod report;

pub use command::{index_command, launcher, report_command, script_contents, write_script};
pub use elog::{Counter, counters_payload, peakfinding_counters, post_counters};
pub use paths::{IndexerPaths, normalize_tag_cxi, run_dir_name};
pub use report::{count_indexed, indexing_rate, total_hits, write_summary};

use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::path::PathBuf;

use crate::utils::config::EnvVars;
use crate::utils::{effective_rank, optional_var, process_rank, required_var};
use crate::{IndexingParams, RunIdentity};

/// Process-level inputs normally read from the environment.
#[derive(Clone, Debug)]
pub struct IndexerEnv {
    /// Cores handed to indexamajig (`NCORES`).
    pub nproc: u32,
    /// Launcher rank; only rank 0 writes.
    pub rank: u32,
    /// Script path override (`TMP_EXE`).
    pub tmp_exe: Option<PathBuf>,
    /// Prefix of the report line in the script (interpreter + executable).
    pub launcher: String,
}

impl IndexerEnv {
    /// Read `NCORES` (required), `TMP_EXE`, `BTX_INTERPRETER` and the launcher rank.
    pub fn from_env() -> Result<Self> {
        let nproc_str = required_var(EnvVars::NCORES)?;
        let nproc: u32 = nproc_str
            .trim()
            .parse()
            .with_context(|| format!("{} is not a core count: {nproc_str:?}", EnvVars::NCORES))?;
        let exe = std::env::current_exe().context("locate current executable")?;
        let interpreter = optional_var(EnvVars::INTERPRETER);
        Ok(Self {
            nproc,
            rank: effective_rank(nproc, process_rank()),
            tmp_exe: optional_var(EnvVars::TMP_EXE).map(PathBuf::from),
            launcher: launcher(interpreter.as_deref(), &exe),
        })
    }
}

/// Result of a report run.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexingSummary {
    pub n_indexed: usize,
    pub n_total: u64,
    /// Indexed fraction, two decimals.
    pub rate: String,
    /// True when counters were posted to the elog.
    pub posted: bool,
}

/// Writes the indexamajig script for one run and reports its results.
#[derive(Clone, Debug)]
pub struct Indexer {
    id: RunIdentity,
    params: IndexingParams,
    paths: IndexerPaths,
    env: IndexerEnv,
}

impl Indexer {
    pub fn new(id: RunIdentity, params: IndexingParams, env: IndexerEnv) -> Self {
        let paths = IndexerPaths::resolve(&id, env.tmp_exe.clone());
        debug!("{:#?}", paths);
        Self {
            id,
            params,
            paths,
            env,
        }
    }

    pub fn paths(&self) -> &IndexerPaths {
        &self.paths
    }

    /// Only the first rank touches the filesystem or the elog.
    pub fn is_writer(&self) -> bool {
        self.env.rank == 0
    }

    /// Full indexamajig command for this run. Requires a geometry file.
    pub fn index_command(&self) -> Result<String> {
        let Some(geom) = &self.params.geom else {
            bail!("a geometry file (--geom) is required to write the indexing executable");
        };
        Ok(index_command(&self.paths, self.env.nproc, geom, &self.params))
    }

    pub fn report_command(&self) -> String {
        report_command(&self.env.launcher, &self.id, &self.paths)
    }

    /// Write the batch script. Returns its path, or None on non-writer ranks.
    pub fn write_exe(&self) -> Result<Option<PathBuf>> {
        if !self.is_writer() {
            debug!("Rank {} skips writing the executable", self.env.rank);
            return Ok(None);
        }
        let contents = script_contents(&self.index_command()?, &self.report_command());
        write_script(&self.paths.tmp_exe, &contents)?;
        info!("Indexing executable written to {}", self.paths.tmp_exe.display());
        Ok(Some(self.paths.tmp_exe.clone()))
    }

    /// Count indexed patterns, write the indexing summary and post counters when `update_url` is set.
    /// Returns None on non-writer ranks.
    pub fn report(&self, update_url: Option<&str>) -> Result<Option<IndexingSummary>> {
        if !self.is_writer() {
            debug!("Rank {} skips reporting", self.env.rank);
            return Ok(None);
        }
        let n_indexed = count_indexed(&self.paths.stream)?;
        let n_total = total_hits(&self.paths.peakfinding_summary)?;
        let rate = indexing_rate(n_indexed, n_total)?;
        write_summary(&self.paths.indexing_summary, n_indexed, &rate)?;
        info!(
            "Indexed {n_indexed} of {n_total} hits (rate {rate}); summary written to {}",
            self.paths.indexing_summary.display()
        );

        let posted = match update_url {
            Some(url) => {
                let pf = peakfinding_counters(&self.paths.peakfinding_summary)?;
                post_counters(url, &counters_payload(pf, n_indexed, &rate))
            }
            None => false,
        };
        Ok(Some(IndexingSummary {
            n_indexed,
            n_total,
            rate,
            posted,
        }))
    }
}
