/// Configuration management for the campus backend.
/// Handles command-line argument parsing and the password-hashing parameters
/// taken from the environment.
use clap::Parser;
use std::env;
use std::path::PathBuf;

use crate::auth::HashParams;

const DEFAULT_ITERATIONS: u32 = 100_000;

#[derive(Parser, Debug)]
#[command(name = "Campus Backend")]
#[command(about = "CRUD teaching backends over SQLite", long_about = None)]
pub struct Config {
    /// Server port (default: 8000)
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// SQLite database file path (default: campus.db)
    #[arg(long, default_value = "campus.db")]
    pub database: PathBuf,

    /// PID file path (optional) - write server PID to this file on startup
    #[arg(long)]
    pub pidfile: Option<PathBuf>,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }
}

/// Password-hashing parameters from PASSWORD_SALT / HASH_ITERATIONS.
/// Falls back to development defaults (with a warning) when unset, so the
/// unprotected endpoints work without any environment.
pub fn hash_params_from_env() -> HashParams {
    let salt = env::var("PASSWORD_SALT").unwrap_or_else(|_| {
        log::warn!("PASSWORD_SALT not set; using development default");
        "campus-dev-salt".to_string()
    });
    let iterations = env::var("HASH_ITERATIONS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ITERATIONS);

    HashParams { salt, iterations }
}
