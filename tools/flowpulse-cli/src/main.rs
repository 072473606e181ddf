//! flowpulse CLI — Replay image sequences through the motion pipeline.
//!
//! Usage:
//!   flowpulse analyze <DIR>                   Report horizontal motion per frame
//!   flowpulse visualize <DIR> --output <DIR>  Write flow visualizations as PNG
//!   flowpulse init-config                     Write the default configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flowpulse_common::config::PipelineConfig;

mod commands;
mod frames;

#[derive(Parser)]
#[command(
    name = "flowpulse",
    about = "Locate horizontal motion in video frame sequences",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the motion pipeline over a directory of frames
    Analyze {
        /// Directory of frames (png, jpg, bmp), processed in file name order
        dir: PathBuf,

        /// Configuration file (defaults to the standard location)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Motion history smoothing factor [0.0, 1.0]
        #[arg(long)]
        alpha: Option<f64>,

        /// Pixels ignored on every side of the flow field
        #[arg(long)]
        edge_clip: Option<usize>,

        /// Threshold percentile [0, 100]
        #[arg(long)]
        percentile: Option<f64>,

        /// Frames a detection is held when motion stops
        #[arg(long)]
        hold_frames: Option<u32>,

        /// Print one JSON report per line
        #[arg(long)]
        json: bool,

        /// Decoded frames buffered ahead of the pipeline
        #[arg(long, default_value = "4")]
        queue_depth: usize,
    },

    /// Write the flow visualization of every frame pair
    Visualize {
        /// Directory of frames
        dir: PathBuf,

        /// Output directory for PNG files
        #[arg(short, long)]
        output: PathBuf,

        /// Configuration file (defaults to the standard location)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Decoded frames buffered ahead of the estimator
        #[arg(long, default_value = "4")]
        queue_depth: usize,
    },

    /// Write the default configuration file
    InitConfig {
        /// Destination (defaults to the standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Resolve configuration first so its logging section applies
    let config = match &cli.command {
        Commands::Analyze { config, .. } | Commands::Visualize { config, .. } => {
            commands::load_config(config.as_deref())?
        }
        Commands::InitConfig { .. } => PipelineConfig::default(),
    };
    flowpulse_common::logging::init_logging(&commands::logging_config(&config, cli.verbose))?;

    match cli.command {
        Commands::Analyze {
            dir,
            config: _,
            alpha,
            edge_clip,
            percentile,
            hold_frames,
            json,
            queue_depth,
        } => {
            commands::analyze::run(
                dir,
                config,
                commands::analyze::AnalyzeOptions {
                    alpha,
                    edge_clip,
                    percentile,
                    hold_frames,
                    json,
                    queue_depth,
                },
            )
            .await?;
        }
        Commands::Visualize {
            dir,
            output,
            config: _,
            queue_depth,
        } => {
            commands::visualize::run(dir, output, config, queue_depth).await?;
        }
        Commands::InitConfig { output, force } => commands::init_config::run(output, force)?,
    }
    Ok(())
}
