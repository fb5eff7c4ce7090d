//! Application configuration constants.
//! Environment variable names, file names and CLI defaults in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    dotenv_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                dotenv_filename: ".env".to_string(),
            }
        })
    }

    /// Per-task-directory config file (`.btx.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    pub fn dotenv_filename(&self) -> &str {
        &self.dotenv_filename
    }
}

// ---- Environment ----

/// Environment variable names read at runtime.
pub struct EnvVars;

impl EnvVars {
    /// Number of cores handed to `indexamajig -j`. Required.
    pub const NCORES: &'static str = "NCORES";
    /// Optional launcher prefixed to the self-invocation line of the script (e.g. a container wrapper).
    pub const INTERPRETER: &'static str = "BTX_INTERPRETER";
    /// Overrides the default script location.
    pub const TMP_EXE: &'static str = "TMP_EXE";
    /// Elog endpoint for progress counters.
    pub const UPDATE_URL: &'static str = "JID_UPDATE_COUNTERS";
    /// Rank variables set by common MPI launchers and slurm, checked in order.
    pub const RANK_VARS: [&'static str; 4] = [
        "OMPI_COMM_WORLD_RANK",
        "PMI_RANK",
        "PMIX_RANK",
        "SLURM_PROCID",
    ];
}

// ---- Indexing defaults ----

/// Defaults for indexamajig parameters when neither CLI nor `.btx.toml` sets them.
pub struct IndexDefaults;

impl IndexDefaults {
    pub const INT_RAD: &'static str = "4,5,6";
    pub const METHODS: &'static str = "xgandalf,mosflm,xds";
    pub const TOLERANCE: &'static str = "5,5,5,1.5";
    pub const NO_REVALIDATE: bool = true;
    pub const MULTI: bool = true;
    pub const PROFILE: bool = true;
}

// ---- External tool ----

/// Name of the CrystFEL indexing executable, resolved through PATH on the cluster node.
pub const INDEXAMAJIG: &str = "indexamajig";

/// Peak source handed to indexamajig (`--peaks=cxi`).
pub const PEAK_SOURCE: &str = "cxi";

/// Script header for the batch executable.
pub const SCRIPT_SHEBANG: &str = "#!/bin/bash";
