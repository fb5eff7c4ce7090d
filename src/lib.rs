//! btx: CrystFEL indexing wrapper and workflow DAG declarations for facility data pipelines.

pub mod dag;
pub mod engine;
pub mod indexer;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use dag::{Dag, JidSlurmOperator, RunLocation};
pub use indexer::{Indexer, IndexerEnv, IndexerPaths, IndexingSummary};

/// Result alias used by public btx API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
