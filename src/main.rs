//! btx CLI: write indexamajig batch scripts, report indexing results, print workflow DAGs.

use anyhow::Result;
use btx::engine::{Cli, handle_run};
use clap::Parser;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
