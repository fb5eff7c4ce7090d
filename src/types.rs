//! Public types for the indexer API: run identity and indexamajig parameters.

use std::path::PathBuf;

use crate::utils::config::IndexDefaults;

/// Identifies one run of one experiment. Every file path the indexer touches derives from this.
#[derive(Clone, Debug)]
pub struct RunIdentity {
    /// Experiment name (e.g. `mfxp22820`).
    pub exp: String,
    /// Run number; rendered zero-padded to four digits in file names.
    pub run: u32,
    /// Detector name, e.g. `epix10k2M` or `jungfrau4M`.
    pub det_type: String,
    /// Suffix for the output stream and indexing summary.
    pub tag: String,
    /// Tag identifying the input cxi files. Normalized by [`IndexerPaths`](crate::indexer::IndexerPaths).
    pub tag_cxi: Option<String>,
    /// Base directory for indexing results.
    pub taskdir: PathBuf,
}

/// Parameters passed verbatim to indexamajig. Values are not validated here;
/// a bad geometry or cell path only shows up when indexamajig runs.
#[derive(Clone, Debug)]
pub struct IndexingParams {
    /// CrystFEL-format geometry file. Required to write the script, unused when reporting.
    pub geom: Option<PathBuf>,
    /// Unit cell file (.pdb or .cell).
    pub cell: Option<PathBuf>,
    /// Integration radii for peak, buffer and background regions (`a,b,c`).
    pub int_rad: String,
    /// Comma-separated indexing methods.
    pub methods: String,
    /// Unit cell comparison tolerances (`a,b,c,ang`).
    pub tolerance: String,
    /// Skip the validation step that drops saturated or edge peaks.
    pub no_revalidate: bool,
    /// Enable multi-lattice indexing.
    pub multi: bool,
    /// Print timing data.
    pub profile: bool,
}

impl Default for IndexingParams {
    fn default() -> Self {
        Self {
            geom: None,
            cell: None,
            int_rad: IndexDefaults::INT_RAD.to_string(),
            methods: IndexDefaults::METHODS.to_string(),
            tolerance: IndexDefaults::TOLERANCE.to_string(),
            no_revalidate: IndexDefaults::NO_REVALIDATE,
            multi: IndexDefaults::MULTI,
            profile: IndexDefaults::PROFILE,
        }
    }
}

/// Full options for one indexer invocation (CLI, after `.btx.toml` and flags are merged).
#[derive(Clone, Debug, Default)]
pub struct Opts {
    pub params: IndexingParams,
    /// Elog endpoint for progress counters. None disables the post.
    pub update_url: Option<String>,
}
