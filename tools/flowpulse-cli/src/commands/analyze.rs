//! Run the motion pipeline over an image sequence.

use std::path::PathBuf;

use flowpulse_common::config::PipelineConfig;
use flowpulse_motion_core::{Detection, FrameReport, MotionPipeline, PipelineStats};

use crate::frames::{list_frames, spawn_decoder};

pub struct AnalyzeOptions {
    pub alpha: Option<f64>,
    pub edge_clip: Option<usize>,
    pub percentile: Option<f64>,
    pub hold_frames: Option<u32>,
    pub json: bool,
    pub queue_depth: usize,
}

/// Replay the frames of `dir` through a pipeline built from `config` and the
/// command-line overrides. Frames rejected with a recoverable error are
/// skipped.
pub async fn run(
    dir: PathBuf,
    mut config: PipelineConfig,
    opts: AnalyzeOptions,
) -> anyhow::Result<PipelineStats> {
    if let Some(alpha) = opts.alpha {
        config.locator.alpha = alpha;
    }
    if let Some(edge_clip) = opts.edge_clip {
        config.locator.edge_clip = edge_clip;
    }
    if let Some(percentile) = opts.percentile {
        config.locator.percentile = percentile;
    }
    if let Some(hold_frames) = opts.hold_frames {
        config.hold_frames = hold_frames;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let paths = list_frames(&dir)?;
    if !opts.json {
        println!("Analyzing {} frames in: {}", paths.len(), dir.display());
        println!(
            "  alpha={} edge_clip={} percentile={} hold_frames={}",
            config.locator.alpha,
            config.locator.edge_clip,
            config.locator.percentile,
            config.hold_frames
        );
    }

    let (mut frames, decoder) = spawn_decoder(paths, opts.queue_depth);
    let Some(first) = frames.recv().await else {
        anyhow::bail!("No frames decoded from {}", dir.display());
    };
    let first = first?;
    let mut pipeline = MotionPipeline::new(&first.frame, &config)
        .map_err(|e| anyhow::anyhow!("Failed to start pipeline: {e}"))?;

    while let Some(decoded) = frames.recv().await {
        let decoded = decoded?;
        match pipeline.process(&decoded.frame) {
            Ok(report) if opts.json => println!("{}", serde_json::to_string(&report)?),
            Ok(report) => print_report(&report),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(frame = %decoded.path.display(), "skipping frame: {e}");
                if !opts.json {
                    println!("  {}: skipped ({e})", decoded.path.display());
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
    decoder.await?;

    let stats = pipeline.stats().clone();
    if opts.json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!();
        println!("Frames processed: {}", stats.frames_processed);
        println!(
            "  detected: {}  held: {}  idle: {}  rejected: {}",
            stats.detected, stats.held, stats.idle, stats.rejected
        );
        println!("  detection rate: {:.1}%", stats.detection_rate() * 100.0);
        println!("  mean latency: {:.2} ms", stats.mean_latency_ms());
        println!("\nAnalysis complete.");
    }

    Ok(stats)
}

fn print_report(report: &FrameReport) {
    match &report.detection {
        Detection::Detected(outcome) => println!(
            "  frame {:>5}: motion at {:?} intensity {:.3} area {} [{:.1} ms]",
            report.frame_index,
            outcome.frame_location,
            outcome.intensity,
            outcome.area,
            report.latency_ms
        ),
        Detection::Held {
            outcome,
            missed_frames,
        } => println!(
            "  frame {:>5}: holding {:?} (missed {missed_frames}) [{:.1} ms]",
            report.frame_index, outcome.frame_location, report.latency_ms
        ),
        Detection::Idle => println!(
            "  frame {:>5}: no motion [{:.1} ms]",
            report.frame_index, report.latency_ms
        ),
    }
}
