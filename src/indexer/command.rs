//! indexamajig command line and the batch script that wraps it.

use anyhow::{Context, Result};
use std::path::Path;

use super::paths::IndexerPaths;
use crate::utils::config::{INDEXAMAJIG, PEAK_SOURCE, SCRIPT_SHEBANG};
use crate::{IndexingParams, RunIdentity};

/// Build the indexamajig invocation. Optional flags follow in a fixed order: pdb, no-revalidate, multi, profile.
pub fn index_command(
    paths: &IndexerPaths,
    nproc: u32,
    geom: &Path,
    params: &IndexingParams,
) -> String {
    let mut command = format!(
        "{INDEXAMAJIG} -i {} -o {} -j {nproc} -g {} --peaks={PEAK_SOURCE} --int-rad={} --indexing={} --tolerance={}",
        paths.lst.display(),
        paths.stream.display(),
        geom.display(),
        params.int_rad,
        params.methods,
        params.tolerance,
    );
    if let Some(cell) = &params.cell {
        command.push_str(&format!(" --pdb={}", cell.display()));
    }
    if params.no_revalidate {
        command.push_str(" --no-revalidate");
    }
    if params.multi {
        command.push_str(" --multi");
    }
    if params.profile {
        command.push_str(" --profile");
    }
    command
}

/// Build the line that reruns this tool in report mode once indexamajig finishes.
/// `launcher` is the interpreter prefix (if any) plus the executable path.
pub fn report_command(launcher: &str, id: &RunIdentity, paths: &IndexerPaths) -> String {
    let mut command = format!(
        "{launcher} index -e {} -r {} -d {} --taskdir {} --report --tag {}",
        id.exp,
        id.run,
        id.det_type,
        id.taskdir.display(),
        id.tag,
    );
    if !paths.tag_cxi.is_empty() {
        command.push_str(&format!(" --tag-cxi {}", paths.tag_cxi));
    }
    command
}

/// Launcher for the report line: optional interpreter followed by the current executable.
pub fn launcher(interpreter: Option<&str>, exe: &Path) -> String {
    match interpreter {
        Some(i) => format!("{i} {}", exe.display()),
        None => exe.display().to_string(),
    }
}

/// Script body: shebang, index command, report command.
pub fn script_contents(index_cmd: &str, report_cmd: &str) -> String {
    format!("{SCRIPT_SHEBANG}\n{index_cmd}\n{report_cmd}\n")
}

/// Write `contents` to `path` and mark it executable (Unix). Creates the parent directory if needed.
pub fn write_script(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create script directory {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("write indexing executable {}", path.display()))?;
    set_executable(path)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("chmod +x {}", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
