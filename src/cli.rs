//! Command-line interface for the relay server.
//!
//! Only the listening address can be set; everything else is compiled in (see `config`).

use clap::Parser;

use crate::config::server::{DEFAULT_HOST, DEFAULT_PORT};

/// Command line arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "chess-relay",
    version,
    about = "Matchmaking and move relay server for two-player board games"
)]
pub struct CliArgs {
    /// Host or interface to bind
    #[arg(long, value_name = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// TCP port to listen on
    #[arg(short, long, value_name = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}
