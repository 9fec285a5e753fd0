//! CLI for the SDM Spotify download manager.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sdm_core::config;

use commands::{run_config, run_download};

/// Top-level CLI for the SDM download manager.
#[derive(Debug, Parser)]
#[command(name = "sdm")]
#[command(about = "SDM: Spotify download manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a track, playlist, album, or artist discography by URL.
    Download {
        /// Spotify URL: https://open.spotify.com/{track|playlist|album|artist}/{id}
        url: String,

        /// Download again even if a finished file already exists.
        #[arg(long)]
        redownload: bool,

        /// Run up to N track downloads concurrently per batch
        /// (default: batch_size from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Show the config file path and current settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!(
            batch_size = cfg.batch_size,
            bitrate_kbps = cfg.bitrate_kbps,
            format = %cfg.format,
            "config loaded"
        );

        match cli.command {
            CliCommand::Download {
                url,
                redownload,
                jobs,
            } => run_download(&cfg, &url, redownload, jobs).await?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}
