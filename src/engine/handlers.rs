//! Command handlers for the index and dag subcommands.

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::dag;
use crate::engine::arg_parser::{Cli, Commands, DagArgs, IndexArgs};
use crate::indexer::{Indexer, IndexerEnv};
use crate::utils::config::EnvVars;
use crate::utils::{
    apply_file_to_opts, load_btx_toml, load_dotenv, optional_var, setup_logging,
};
use crate::{Opts, RunIdentity};

/// Overwrite opts field from CLI when the flag was given.
macro_rules! apply_cli_opt {
    ($args:expr, $target:expr, $field:ident) => {
        if let Some(ref v) = $args.$field {
            $target.$field = v.clone();
        }
    };
}

/// Merge defaults, `.btx.toml` from the task directory, then CLI flags.
/// Loads the task directory's `.env` first; the update url resolves flag > environment > file.
pub fn setup_opts(args: &IndexArgs) -> Opts {
    load_dotenv(&args.taskdir);
    let mut opts = Opts::default();
    if let Some(file) = load_btx_toml(&args.taskdir) {
        debug!("Applying {} config", args.taskdir.display());
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(ref geom) = args.geom {
        opts.params.geom = Some(geom.clone());
    }
    if let Some(ref cell) = args.cell {
        opts.params.cell = Some(cell.clone());
    }
    apply_cli_opt!(args, opts.params, int_rad);
    apply_cli_opt!(args, opts.params, methods);
    apply_cli_opt!(args, opts.params, tolerance);
    apply_cli_opt!(args, opts.params, no_revalidate);
    apply_cli_opt!(args, opts.params, multi);
    apply_cli_opt!(args, opts.params, profile);
    if let Some(url) = args
        .update_url
        .clone()
        .or_else(|| optional_var(EnvVars::UPDATE_URL))
    {
        opts.update_url = Some(url);
    }
    opts
}

pub fn run_identity(args: &IndexArgs) -> RunIdentity {
    RunIdentity {
        exp: args.exp.clone(),
        run: args.run,
        det_type: args.det_type.clone(),
        tag: args.tag.clone(),
        tag_cxi: args.tag_cxi.clone(),
        taskdir: args.taskdir.clone(),
    }
}

/// Write the indexing executable, or report results when `--report`.
pub fn handle_index(args: &IndexArgs) -> Result<()> {
    let opts = setup_opts(args);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    let env = IndexerEnv::from_env()?;
    let indexer = Indexer::new(run_identity(args), opts.params, env);

    if args.report {
        if opts.update_url.is_none() {
            debug!("No elog update url; skipping post");
        }
        if let Some(summary) = indexer.report(opts.update_url.as_deref())?
            && opts.update_url.is_some()
            && !summary.posted
        {
            warn!(
                "Indexing summary written to {} but elog counters were not updated",
                indexer.paths().indexing_summary.display()
            );
        }
    } else {
        indexer.write_exe()?;
    }
    Ok(())
}

/// Print a DAG as an edge list, or as JSON with `--json`.
pub fn handle_dag(args: &DagArgs) -> Result<()> {
    let dag = dag::builtin(&args.name)?;
    let order = dag.execution_order()?;
    debug!("Execution order: {}", order.join(" -> "));
    if args.json {
        let json = serde_json::to_string_pretty(&dag).context("serialize DAG")?;
        println!("{json}");
    } else {
        print!("{dag}");
    }
    Ok(())
}

/// Dispatch a parsed command line.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose);
    match &cli.command {
        Commands::Index(args) => handle_index(args),
        Commands::Dag(args) => handle_dag(args),
    }
}
