pub mod auth;
pub mod commands;
pub mod config;
pub mod input;

pub use auth::keys_from_secret;
pub use commands::{run_dedupe, run_metadata, run_operations, run_stop};
pub use config::{CliConfig, Credentials};
pub use input::{load_events, parse_events};
