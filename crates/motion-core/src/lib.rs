//! flowpulse Motion Core — horizontal motion localization
//!
//! Turns a stream of video frames into a per-frame horizontal motion
//! location and intensity:
//! - **Flow:** Dense polynomial-expansion optical flow between consecutive frames
//! - **Motion History:** Exponentially decaying accumulation of a scalar field
//! - **Horizontal Blob:** Percentile threshold, largest connected region, centroid
//! - **Pipeline:** Composes the above with a hold policy for motionless frames
//!
//! This crate is pure computation with no I/O or platform dependencies.
//! All inputs are data; all outputs are data.

mod farneback;
mod resample;

pub mod flow;
pub mod horizontal_blob;
pub mod motion_history;
pub mod pipeline;
pub mod regions;
pub mod visualize;

pub use flow::{FlowEstimator, FlowField};
pub use horizontal_blob::{BlobOutcome, HorizontalBlobLocator};
pub use motion_history::{MotionHistory, Quantization, Sample};
pub use pipeline::{Detection, FrameReport, MotionPipeline, PipelineStats};
pub use regions::{Moments, Region};
