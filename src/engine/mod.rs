//! CLI front end: argument parsing and subcommand handlers.

pub mod arg_parser;
pub mod handlers;

pub use arg_parser::{Cli, Commands, DagArgs, IndexArgs};
pub use handlers::{handle_dag, handle_index, handle_run, run_identity, setup_opts};
