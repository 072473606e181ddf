//! Rolling dense optical flow over a frame stream.

use std::f32::consts::TAU;

use flowpulse_common::config::FlowParams;
use flowpulse_common::error::{MotionError, MotionResult};
use flowpulse_frame_model::{Field, Frame, Shape};
use image::{Rgb, RgbImage};

use crate::farneback::dense_flow;
use crate::visualize::render_flow;

/// Per-pixel displacement between two frames, in Cartesian and polar form.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
    pub dx: Field<f32>,
    pub dy: Field<f32>,
    pub mag: Field<f32>,
    /// Radians in `[0, 2π)`.
    pub ang: Field<f32>,
}

impl FlowField {
    pub fn zeros(shape: Shape) -> Self {
        Self {
            dx: Field::zeros(shape),
            dy: Field::zeros(shape),
            mag: Field::zeros(shape),
            ang: Field::zeros(shape),
        }
    }

    /// Build from `(dx, dy)` components, deriving magnitude and angle.
    pub fn from_components(dx: Field<f32>, dy: Field<f32>) -> MotionResult<Self> {
        let mag = dx.zip_map(&dy, |x, y| x.hypot(y))?;
        let ang = dx.zip_map(&dy, polar_angle)?;
        Ok(Self { dx, dy, mag, ang })
    }

    /// Build from polar `(mag, ang)`, deriving the components.
    pub fn from_polar(mag: Field<f32>, ang: Field<f32>) -> MotionResult<Self> {
        let dx = mag.zip_map(&ang, |m, a| m * a.cos())?;
        let dy = mag.zip_map(&ang, |m, a| m * a.sin())?;
        let ang = ang.map(|a| a.rem_euclid(TAU));
        Ok(Self { dx, dy, mag, ang })
    }

    pub fn shape(&self) -> Shape {
        self.mag.shape()
    }
}

/// `atan2(y, x)` wrapped into `[0, 2π)`.
fn polar_angle(x: f32, y: f32) -> f32 {
    let a = y.atan2(x);
    let a = if a < 0.0 { a + TAU } else { a };
    // -0.0 + TAU rounds to TAU in f32
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Holds the previous grayscale frame and recomputes flow on every update.
#[derive(Debug, Clone)]
pub struct FlowEstimator {
    params: FlowParams,
    shape: Shape,
    prev: Field<f32>,
    flow: FlowField,
    hsv: RgbImage,
    vis: RgbImage,
    frames: u64,
}

impl FlowEstimator {
    /// Start a stream from its first frame with the default flow parameters.
    pub fn new(first: &Frame) -> Self {
        Self::build(first, FlowParams::default())
    }

    pub fn with_params(first: &Frame, params: FlowParams) -> MotionResult<Self> {
        params.validate()?;
        Ok(Self::build(first, params))
    }

    fn build(first: &Frame, params: FlowParams) -> Self {
        let shape = first.shape();
        let (width, height) = (shape.cols as u32, shape.rows as u32);
        Self {
            params,
            shape,
            prev: first.to_gray_field(),
            flow: FlowField::zeros(shape),
            hsv: RgbImage::from_pixel(width, height, Rgb([255, 255, 255])),
            vis: RgbImage::new(width, height),
            frames: 0,
        }
    }

    /// Compute flow from the stored frame to `frame`, then keep `frame` as
    /// the new reference.
    ///
    /// A frame with different geometry fails with `GeometryChanged` and
    /// leaves the estimator untouched.
    pub fn update(&mut self, frame: &Frame) -> MotionResult<&FlowField> {
        let shape = frame.shape();
        if shape != self.shape {
            return Err(MotionError::geometry_changed(self.shape.dims(), shape.dims()));
        }

        let next = frame.to_gray_field();
        let (dx, dy) = dense_flow(&self.prev, &next, &self.params);
        self.flow = FlowField::from_components(dx, dy)?;
        self.prev = next;
        self.frames += 1;
        render_flow(&self.flow, &mut self.hsv, &mut self.vis);

        tracing::trace!(frame = self.frames, shape = %self.shape, "flow updated");
        Ok(&self.flow)
    }

    /// Flow from the most recent update (all zeros before the first).
    pub fn flow(&self) -> &FlowField {
        &self.flow
    }

    /// RGB rendering of the current flow.
    pub fn visualization(&self) -> &RgbImage {
        &self.vis
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn params(&self) -> &FlowParams {
        &self.params
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames
    }
}
