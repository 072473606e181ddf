//! Write the flow visualization of an image sequence.

use std::path::PathBuf;

use flowpulse_common::config::PipelineConfig;
use flowpulse_motion_core::FlowEstimator;

use crate::frames::{list_frames, spawn_decoder};

/// Write `{stem}_flow.png` into `output` for every frame after the first.
/// Returns the number of images written.
pub async fn run(
    dir: PathBuf,
    output: PathBuf,
    config: PipelineConfig,
    queue_depth: usize,
) -> anyhow::Result<usize> {
    let paths = list_frames(&dir)?;
    std::fs::create_dir_all(&output)?;
    println!("Visualizing {} frames from: {}", paths.len(), dir.display());

    let (mut frames, decoder) = spawn_decoder(paths, queue_depth);
    let Some(first) = frames.recv().await else {
        anyhow::bail!("No frames decoded from {}", dir.display());
    };
    let first = first?;
    let mut estimator = FlowEstimator::with_params(&first.frame, config.flow)
        .map_err(|e| anyhow::anyhow!("Invalid flow parameters: {e}"))?;

    let mut written = 0usize;
    while let Some(decoded) = frames.recv().await {
        let decoded = decoded?;
        if let Err(e) = estimator.update(&decoded.frame) {
            tracing::warn!(frame = %decoded.path.display(), "skipping frame: {e}");
            continue;
        }

        let stem = decoded
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("frame{written:05}"));
        let target = output.join(format!("{stem}_flow.png"));
        estimator
            .visualization()
            .save(&target)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", target.display()))?;
        written += 1;
    }
    decoder.await?;

    println!("  Wrote {written} visualizations to: {}", output.display());
    Ok(written)
}
