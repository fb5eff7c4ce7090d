pub mod btx_toml;
pub mod config;
pub mod env;
pub mod logger;

pub use btx_toml::{apply_file_to_opts, load_btx_toml};
pub use config::*;
pub use env::{
    effective_rank, gated_process_rank, load_dotenv, optional_var, process_rank, required_var,
};
pub use logger::setup_logging;
