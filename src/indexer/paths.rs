//! File layout of a run inside the task directory.
//!
//! ```text
//! {taskdir}/r{run:04}/r{run:04}{tag_cxi}.lst          input list for indexamajig
//! {taskdir}/r{run:04}_{tag}.stream                    indexamajig output
//! {taskdir}/r{run:04}/index_r{run:04}.sh              batch script (or $TMP_EXE)
//! {taskdir}/r{run:04}/peakfinding{tag_cxi}.summary    written by peak finding
//! {taskdir}/r{run:04}/indexing_{tag}.summary          written by the reporter
//! ```

use std::path::{Path, PathBuf};

use crate::RunIdentity;

/// Prefix a non-empty cxi tag with `_` unless it already has one. `None` and `""` become `""`.
pub fn normalize_tag_cxi(tag_cxi: Option<&str>) -> String {
    match tag_cxi {
        None | Some("") => String::new(),
        Some(t) if t.starts_with('_') => t.to_string(),
        Some(t) => format!("_{t}"),
    }
}

/// `r0007` for run 7.
pub fn run_dir_name(run: u32) -> String {
    format!("r{run:04}")
}

/// Resolved paths for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexerPaths {
    /// Normalized cxi tag (`""` or `_tag`).
    pub tag_cxi: String,
    pub lst: PathBuf,
    pub stream: PathBuf,
    pub tmp_exe: PathBuf,
    pub peakfinding_summary: PathBuf,
    pub indexing_summary: PathBuf,
}

impl IndexerPaths {
    /// Resolve every path for `id`. `tmp_exe_override` (from `TMP_EXE`) replaces the default script path.
    pub fn resolve(id: &RunIdentity, tmp_exe_override: Option<PathBuf>) -> Self {
        let tag_cxi = normalize_tag_cxi(id.tag_cxi.as_deref());
        let rdir = run_dir_name(id.run);
        let run_path = id.taskdir.join(&rdir);
        Self {
            lst: run_path.join(format!("{rdir}{tag_cxi}.lst")),
            stream: id.taskdir.join(format!("{rdir}_{}.stream", id.tag)),
            tmp_exe: tmp_exe_override
                .unwrap_or_else(|| run_path.join(format!("index_{rdir}.sh"))),
            peakfinding_summary: run_path.join(format!("peakfinding{tag_cxi}.summary")),
            indexing_summary: run_path.join(format!("indexing_{}.summary", id.tag)),
            tag_cxi,
        }
    }

    /// Directory holding the per-run files (`{taskdir}/r{run:04}`).
    pub fn run_dir(&self) -> &Path {
        self.lst.parent().unwrap_or(Path::new("."))
    }
}
