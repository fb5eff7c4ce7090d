use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

use crate::utils::env::gated_process_rank;

/// Install the crate logger: debug for this crate when `verbose`, warn for dependencies.
/// Lines from non-zero ranks (multi-core jobs only) carry the rank (`[btx r3]`) so interleaved MPI output stays readable.
/// Later calls are ignored.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let tag = match gated_process_rank() {
        0 => env!("CARGO_PKG_NAME").to_string(),
        r => format!("{} r{}", env!("CARGO_PKG_NAME"), r),
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(move |buf, record| {
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = if record.level() == Level::Warn {
                        "WARN".yellow()
                    } else {
                        "ERROR".red()
                    };
                    let target = record.target().to_string().white();
                    format!("[{} {} {}] {}", tag.cyan(), level_str, target, record.args())
                }
                _ => format!("[{}] {}", tag.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
