//! Image-sequence replay standing in for a live capture source.
//!
//! Frames are decoded on a blocking task and handed to the caller through a
//! bounded channel, in file name order.

use std::path::{Path, PathBuf};

use anyhow::Context;
use flowpulse_frame_model::Frame;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

pub struct DecodedFrame {
    pub path: PathBuf,
    pub frame: Frame,
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_frames(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read frame directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_frame = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
        if is_frame {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        anyhow::bail!("No frames found in {}", dir.display());
    }
    Ok(paths)
}

/// Decode `paths` in order on a blocking task.
///
/// At most `queue_depth` decoded frames wait in the channel. Decoding stops
/// after the first failure (which is delivered) or when the receiver is
/// dropped.
pub fn spawn_decoder(
    paths: Vec<PathBuf>,
    queue_depth: usize,
) -> (mpsc::Receiver<anyhow::Result<DecodedFrame>>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(queue_depth.max(1));
    let handle = tokio::task::spawn_blocking(move || {
        for path in paths {
            let decoded = image::open(&path)
                .with_context(|| format!("Failed to decode {}", path.display()))
                .map(|img| DecodedFrame {
                    frame: Frame::from(img),
                    path: path.clone(),
                });
            let failed = decoded.is_err();
            if tx.blocking_send(decoded).is_err() || failed {
                break;
            }
        }
    });
    (rx, handle)
}
