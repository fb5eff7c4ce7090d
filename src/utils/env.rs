//! Environment lookups: `.env` in the task dir, required variables, process rank.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use crate::utils::config::{EnvVars, PackagePaths};

/// Load `.env` from `dir` if present. Variables already set in the process win.
pub fn load_dotenv(dir: &Path) {
    let env_path = dir.join(PackagePaths::get().dotenv_filename());
    if env_path.is_file() {
        match dotenvy::from_path(&env_path) {
            Ok(()) => debug!("Loaded environment from {}", env_path.display()),
            Err(e) => log::warn!("{}: {}", env_path.display(), e),
        }
    }
}

/// Read a variable that must be set (e.g. `NCORES`).
pub fn required_var(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("environment variable {name} is not set"))
}

/// Read a variable; unset and blank are both `None`.
pub fn optional_var(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Rank of this process as reported by the launcher; 0 when no launcher variable is set.
pub fn process_rank() -> u32 {
    rank_from(|name| std::env::var(name).ok())
}

/// First parseable rank among [`EnvVars::RANK_VARS`], looked up through `lookup`.
pub fn rank_from<F>(lookup: F) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    EnvVars::RANK_VARS
        .iter()
        .filter_map(|name| non_blank(lookup(*name)))
        .find_map(|v| v.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Rank used to gate writes: only meaningful when running on more than one core.
pub fn effective_rank(nproc: u32, rank: u32) -> u32 {
    if nproc > 1 { rank } else { 0 }
}

/// [`rank_from`] gated by `NCORES` through `lookup`. Missing or unparseable `NCORES` counts as one core.
pub fn gated_rank_from<F>(lookup: F) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    let nproc = non_blank(lookup(EnvVars::NCORES))
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(1);
    effective_rank(nproc, rank_from(lookup))
}

/// Rank of this process as the write gate sees it.
pub fn gated_process_rank() -> u32 {
    gated_rank_from(|name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn rank_defaults_to_zero() {
        assert_eq!(rank_from(lookup(&[])), 0);
    }

    #[test]
    fn rank_prefers_openmpi_over_slurm() {
        let vars = [("SLURM_PROCID", "5"), ("OMPI_COMM_WORLD_RANK", "2")];
        assert_eq!(rank_from(lookup(&vars)), 2);
    }

    #[test]
    fn rank_skips_blank_and_garbage() {
        let vars = [("OMPI_COMM_WORLD_RANK", " "), ("PMI_RANK", "x"), ("PMIX_RANK", "3")];
        assert_eq!(rank_from(lookup(&vars)), 3);
    }

    #[test]
    fn gated_rank_ignores_launcher_on_one_core() {
        let vars = [("SLURM_PROCID", "3"), ("NCORES", "1")];
        assert_eq!(gated_rank_from(lookup(&vars)), 0);
        assert_eq!(gated_rank_from(lookup(&[("SLURM_PROCID", "3")])), 0);
        let vars = [("SLURM_PROCID", "3"), ("NCORES", "4")];
        assert_eq!(gated_rank_from(lookup(&vars)), 3);
    }

    #[test]
    fn single_core_is_always_rank_zero() {
        assert_eq!(effective_rank(1, 4), 0);
        assert_eq!(effective_rank(8, 4), 4);
    }
}
