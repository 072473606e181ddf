//! Frame-by-frame driver composing flow estimation and blob location.
//!
//! Adds the caller-side policy for frames without motion: the previous
//! detection is re-reported for up to `hold_frames` consecutive misses
//! before the pipeline reports idle.

use std::time::Instant;

use flowpulse_common::config::PipelineConfig;
use flowpulse_common::error::{MotionError, MotionResult};
use flowpulse_frame_model::Frame;
use serde::{Deserialize, Serialize};

use crate::flow::FlowEstimator;
use crate::horizontal_blob::{BlobOutcome, HorizontalBlobLocator};

/// What the pipeline reports for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Detection {
    /// A blob was located in this frame.
    Detected(BlobOutcome),
    /// No motion this frame; the last detection is still reported.
    Held {
        outcome: BlobOutcome,
        missed_frames: u32,
    },
    /// No motion and nothing left to hold.
    Idle,
}

impl Detection {
    /// Outcome to act on, if any.
    pub fn outcome(&self) -> Option<&BlobOutcome> {
        match self {
            Detection::Detected(outcome) | Detection::Held { outcome, .. } => Some(outcome),
            Detection::Idle => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Position in the stream; the frame the pipeline was built from is 0.
    pub frame_index: u64,
    pub detection: Detection,
    pub latency_ms: f64,
}

/// Running counters over a pipeline's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub frames_processed: u64,
    pub detected: u64,
    pub held: u64,
    pub idle: u64,
    /// Frames refused with an error (geometry change and the like).
    pub rejected: u64,
    pub total_latency_ms: f64,
}

impl PipelineStats {
    pub fn mean_latency_ms(&self) -> f64 {
        if self.frames_processed == 0 {
            0.0
        } else {
            self.total_latency_ms / self.frames_processed as f64
        }
    }

    /// Fraction of processed frames with a fresh detection.
    pub fn detection_rate(&self) -> f64 {
        if self.frames_processed == 0 {
            0.0
        } else {
            self.detected as f64 / self.frames_processed as f64
        }
    }
}

pub struct MotionPipeline {
    estimator: FlowEstimator,
    locator: HorizontalBlobLocator,
    hold_frames: u32,
    last_outcome: Option<BlobOutcome>,
    missed: u32,
    frames_seen: u64,
    stats: PipelineStats,
}

impl MotionPipeline {
    pub fn new(first: &Frame, config: &PipelineConfig) -> MotionResult<Self> {
        config.validate()?;
        let estimator = FlowEstimator::with_params(first, config.flow)?;
        let locator = HorizontalBlobLocator::for_estimator(&estimator, config.locator)?;
        tracing::debug!(
            shape = %estimator.shape(),
            edge_clip = config.locator.edge_clip,
            alpha = config.locator.alpha,
            "motion pipeline ready"
        );
        Ok(Self {
            estimator,
            locator,
            hold_frames: config.hold_frames,
            last_outcome: None,
            missed: 0,
            frames_seen: 0,
            stats: PipelineStats::default(),
        })
    }

    /// Run one frame through flow estimation and blob location.
    ///
    /// `NoMotionDetected` is absorbed into `Held` or `Idle`; every other
    /// error is returned and leaves the pipeline ready for the next frame.
    pub fn process(&mut self, frame: &Frame) -> MotionResult<FrameReport> {
        let started = Instant::now();
        self.frames_seen += 1;
        let frame_index = self.frames_seen;

        let located = self
            .estimator
            .update(frame)
            .and_then(|flow| self.locator.compute(flow));

        let detection = match located {
            Ok(outcome) => {
                self.last_outcome = Some(outcome);
                self.missed = 0;
                self.stats.detected += 1;
                Detection::Detected(outcome)
            }
            Err(MotionError::NoMotionDetected) => {
                self.missed = self.missed.saturating_add(1);
                match self.last_outcome {
                    Some(outcome) if self.missed <= self.hold_frames => {
                        self.stats.held += 1;
                        Detection::Held {
                            outcome,
                            missed_frames: self.missed,
                        }
                    }
                    _ => {
                        self.stats.idle += 1;
                        Detection::Idle
                    }
                }
            }
            Err(e) => {
                self.stats.rejected += 1;
                tracing::warn!(frame_index, error = %e, "frame rejected");
                return Err(e);
            }
        };

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.stats.frames_processed += 1;
        self.stats.total_latency_ms += latency_ms;
        tracing::debug!(frame_index, latency_ms, ?detection, "frame processed");

        Ok(FrameReport {
            frame_index,
            detection,
            latency_ms,
        })
    }

    /// Clear the motion history and the hold state. Counters are kept.
    pub fn reset(&mut self) {
        self.locator.reset();
        self.last_outcome = None;
        self.missed = 0;
    }

    pub fn estimator(&self) -> &FlowEstimator {
        &self.estimator
    }

    pub fn locator(&self) -> &HorizontalBlobLocator {
        &self.locator
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn hold_frames(&self) -> u32 {
        self.hold_frames
    }
}
