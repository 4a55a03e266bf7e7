//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod auth;
pub mod config;
pub mod draw;
pub mod history;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cl_storage::{ConfigStore, FileSystemStorage};

/// comment-lottery - draw winners from the commenters of a post
#[derive(Debug, Parser)]
#[command(name = "comment-lottery")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COMMENT_LOTTERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the draw history
    #[arg(long, global = true, env = "COMMENT_LOTTERY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch a post's comments and draw winners
    Draw(draw::DrawArgs),

    /// Manage the login cookie
    #[command(subcommand)]
    Auth(auth::AuthCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),

    /// Browse past draws
    #[command(subcommand)]
    History(history::HistoryCommand),
}

/// Locations resolved from the global flags
pub struct AppContext {
    pub config_store: ConfigStore,
    data_dir: Option<PathBuf>,
}

impl AppContext {
    fn new(config: Option<PathBuf>, data_dir: Option<PathBuf>) -> Self {
        let config_store = match config {
            Some(path) => ConfigStore::new(path),
            None => ConfigStore::default_location(),
        };
        Self {
            config_store,
            data_dir,
        }
    }

    /// Open the draw history
    pub fn draw_storage(&self) -> Result<FileSystemStorage> {
        let storage = match &self.data_dir {
            Some(dir) => FileSystemStorage::new(dir),
            None => FileSystemStorage::default_location(),
        };
        storage.context("Failed to open draw history")
    }
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
        console::set_colors_enabled(false);
    }

    let ctx = AppContext::new(cli.config, cli.data_dir);

    // Dispatch to command handler
    match cli.command {
        Commands::Draw(args) => draw::execute(args, &ctx),
        Commands::Auth(cmd) => auth::execute(cmd, &ctx),
        Commands::Config(cmd) => config::execute(cmd, &ctx),
        Commands::History(cmd) => history::execute(cmd, &ctx),
    }
}

/// Single-threaded runtime for the network commands
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
