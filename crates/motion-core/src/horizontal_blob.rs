//! Locating the dominant region of horizontal motion.
//!
//! Each call projects the flow onto the horizontal axis, smooths it through a
//! [`MotionHistory`], keeps the cells above a percentile of the smoothed
//! field and reports the centroid of the largest connected region.

use flowpulse_common::config::LocatorConfig;
use flowpulse_common::error::{MotionError, MotionResult};
use flowpulse_frame_model::{Field, Shape};
use serde::{Deserialize, Serialize};

use crate::flow::{FlowEstimator, FlowField};
use crate::motion_history::MotionHistory;
use crate::regions::{largest_region, Region};

pub const DEFAULT_PERCENTILE: f64 = 80.0;

/// Result of one successful [`HorizontalBlobLocator::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlobOutcome {
    /// Smoothed horizontal motion at the centroid.
    pub intensity: f64,
    /// Centroid `(row, col)` in motion-history coordinates.
    pub location: (usize, usize),
    /// Centroid `(row, col)` in frame coordinates.
    pub frame_location: (usize, usize),
    /// Filled area of the region in cells.
    pub area: usize,
}

/// `mag · cos²(ang)` for every cell. Fails with `ShapeMismatch` when the
/// angle field does not match the magnitude field.
pub fn horizontal_magnitude(flow: &FlowField) -> MotionResult<Field<f64>> {
    flow.mag.zip_map(&flow.ang, |m, a| {
        let c = (a as f64).cos();
        m as f64 * c * c
    })
}

/// `p`-th percentile of `values`, interpolating linearly between the two
/// closest ranks. `None` for empty input or `p` outside `[0, 100]`.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }
    let mut buf = values.to_vec();
    let rank = p / 100.0 * (buf.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = rank - lo as f64;

    let (_, &mut lo_value, upper) = buf.select_nth_unstable_by(lo, f64::total_cmp);
    if frac == 0.0 || upper.is_empty() {
        return Some(lo_value);
    }
    let hi_value = upper.iter().copied().min_by(f64::total_cmp)?;
    Some(lo_value + (hi_value - lo_value) * frac)
}

/// Cells strictly above the `p`-th percentile of `field`.
pub fn threshold_mask(field: &Field<f64>, p: f64) -> Field<bool> {
    match percentile(field.cells(), p) {
        Some(threshold) => field.map(|v| v > threshold),
        None => Field::zeros(field.shape()),
    }
}

/// Tracks the largest horizontally moving region across a flow stream.
#[derive(Debug, Clone)]
pub struct HorizontalBlobLocator {
    config: LocatorConfig,
    flow_shape: Shape,
    history: MotionHistory<f64>,
    last_region: Option<Region>,
}

impl HorizontalBlobLocator {
    /// Locator for flow fields of `flow_shape`.
    ///
    /// The motion history covers the flow shape minus `edge_clip` cells on
    /// every side; a clip that leaves nothing is a configuration error.
    pub fn new(flow_shape: Shape, config: LocatorConfig) -> MotionResult<Self> {
        config.validate()?;
        let history_shape = flow_shape.shrink(config.edge_clip).ok_or_else(|| {
            MotionError::config(format!(
                "edge clip {} leaves no cells of a {flow_shape} flow field",
                config.edge_clip
            ))
        })?;
        Ok(Self {
            config,
            flow_shape,
            history: MotionHistory::new(history_shape, config.alpha)?,
            last_region: None,
        })
    }

    /// Locator sized for the flow produced by `estimator`.
    pub fn for_estimator(estimator: &FlowEstimator, config: LocatorConfig) -> MotionResult<Self> {
        Self::new(estimator.shape(), config)
    }

    /// Fold `flow` into the motion history and locate the dominant blob.
    ///
    /// Fails with `NoMotionDetected` when no cell exceeds the threshold,
    /// with `GeometryChanged` when `flow` has an unexpected shape and with
    /// `ShapeMismatch` when its components disagree.
    pub fn compute(&mut self, flow: &FlowField) -> MotionResult<BlobOutcome> {
        if flow.shape() != self.flow_shape {
            return Err(MotionError::geometry_changed(
                self.flow_shape.dims(),
                flow.shape().dims(),
            ));
        }

        let clip = self.config.edge_clip;
        let hmag = horizontal_magnitude(flow)?;
        let cropped = hmag.crop(clip).ok_or_else(|| {
            MotionError::geometry_changed(self.flow_shape.dims(), flow.shape().dims())
        })?;

        let smoothed = self.history.update(&cropped)?;
        let mask = threshold_mask(smoothed, self.config.percentile);

        let Some(region) = largest_region(&mask) else {
            self.last_region = None;
            tracing::trace!("no foreground above percentile {}", self.config.percentile);
            return Err(MotionError::NoMotionDetected);
        };

        let (row, col) = region.centroid();
        let outcome = BlobOutcome {
            intensity: smoothed[(row, col)],
            location: (row, col),
            frame_location: (row + clip, col + clip),
            area: region.area,
        };
        tracing::debug!(
            row,
            col,
            area = outcome.area,
            intensity = outcome.intensity,
            "horizontal blob located"
        );
        self.last_region = Some(region);
        Ok(outcome)
    }

    /// Clear the motion history and the last region.
    pub fn reset(&mut self) {
        self.history.reset();
        self.last_region = None;
    }

    pub fn history(&self) -> &MotionHistory<f64> {
        &self.history
    }

    /// Region behind the most recent successful `compute`.
    pub fn last_region(&self) -> Option<&Region> {
        self.last_region.as_ref()
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn flow_shape(&self) -> Shape {
        self.flow_shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};
    use std::ops::Range;

    fn config(edge_clip: usize, alpha: f64) -> LocatorConfig {
        LocatorConfig {
            edge_clip,
            alpha,
            percentile: DEFAULT_PERCENTILE,
        }
    }

    /// Flow of magnitude `mag` and angle `ang` inside the given block, zero
    /// elsewhere.
    fn block_flow(
        shape: Shape,
        rows: Range<usize>,
        cols: Range<usize>,
        mag: f32,
        ang: f32,
    ) -> FlowField {
        let inside = |r: usize, c: usize| rows.contains(&r) && cols.contains(&c);
        let mags = Field::from_fn(shape, |r, c| if inside(r, c) { mag } else { 0.0 });
        let angs = Field::from_fn(shape, |r, c| if inside(r, c) { ang } else { 0.0 });
        FlowField::from_polar(mags, angs).unwrap()
    }

    #[test]
    fn projection_keeps_horizontal_and_drops_vertical() {
        let shape = Shape::new(1, 2);
        let mag = Field::from_vec(shape, vec![3.0f32, 3.0]).unwrap();
        let ang = Field::from_vec(shape, vec![0.0f32, FRAC_PI_2]).unwrap();
        let flow = FlowField::from_polar(mag, ang).unwrap();
        let hmag = horizontal_magnitude(&flow).unwrap();
        assert!((hmag[(0, 0)] - 3.0).abs() < 1e-9);
        assert!(hmag[(0, 1)].abs() < 1e-6);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, 50.0), Some(2.5));
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(4.0));
        assert!((percentile(&values, 80.0).unwrap() - 3.4).abs() < 1e-12);
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&values, 101.0), None);
    }

    #[test]
    fn threshold_keeps_expected_fraction() {
        let field = Field::from_fn(Shape::new(10, 10), |r, c| (r * 10 + c) as f64);
        for (p, expected) in [(80.0, 20), (50.0, 50), (95.0, 5), (0.0, 99)] {
            let mask = threshold_mask(&field, p);
            let count = mask.cells().iter().filter(|&&b| b).count();
            assert_eq!(count, expected, "percentile {p}");
        }
    }

    #[test]
    fn zero_flow_reports_no_motion() {
        let shape = Shape::new(32, 32);
        let mut locator = HorizontalBlobLocator::new(shape, config(4, 0.5)).unwrap();
        let result = locator.compute(&FlowField::zeros(shape));
        assert!(matches!(result, Err(MotionError::NoMotionDetected)));
        assert!(locator.last_region().is_none());
        assert!(locator.history().state().cells().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn locates_block_of_horizontal_motion() {
        let shape = Shape::new(40, 48);
        let mut locator = HorizontalBlobLocator::new(shape, config(4, 1.0)).unwrap();
        let flow = block_flow(shape, 10..20, 14..30, 2.0, 0.0);

        let outcome = locator.compute(&flow).unwrap();
        assert_eq!(outcome.location, (10, 17));
        assert_eq!(outcome.frame_location, (14, 21));
        assert_eq!(outcome.area, 160);
        assert!((outcome.intensity - 2.0).abs() < 1e-9);
        assert_eq!(locator.last_region().map(|r| r.area), Some(160));
    }

    #[test]
    fn history_accumulates_between_calls() {
        let shape = Shape::new(24, 24);
        let mut locator = HorizontalBlobLocator::new(shape, config(2, 0.5)).unwrap();
        let flow = block_flow(shape, 8..12, 8..12, 4.0, PI);

        let first = locator.compute(&flow).unwrap();
        let second = locator.compute(&flow).unwrap();
        assert!((first.intensity - 2.0).abs() < 1e-5);
        assert!((second.intensity - 3.0).abs() < 1e-5);
        assert_eq!(locator.history().updates(), 2);

        locator.reset();
        assert_eq!(locator.history().updates(), 0);
        assert!(locator.last_region().is_none());
    }

    #[test]
    fn geometry_change_is_rejected() {
        let mut locator = HorizontalBlobLocator::new(Shape::new(32, 32), config(4, 0.5)).unwrap();
        match locator.compute(&FlowField::zeros(Shape::new(32, 16))) {
            Err(MotionError::GeometryChanged { expected, actual }) => {
                assert_eq!(expected, (32, 32));
                assert_eq!(actual, (32, 16));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(locator.history().updates(), 0);
    }

    #[test]
    fn mismatched_angle_field_is_reported() {
        let shape = Shape::new(16, 16);
        let mut locator = HorizontalBlobLocator::new(shape, config(2, 1.0)).unwrap();
        let mut flow = block_flow(shape, 6..10, 6..10, 5.0, 0.0);
        flow.ang = Field::zeros(Shape::new(16, 8));

        match locator.compute(&flow) {
            Err(MotionError::ShapeMismatch { expected, actual }) => {
                assert_eq!(expected, (16, 16));
                assert_eq!(actual, (16, 8));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(locator.history().updates(), 0);
        assert!(horizontal_magnitude(&flow).is_err());
    }

    #[test]
    fn construction_validates_config() {
        let shape = Shape::new(16, 16);
        assert!(matches!(
            HorizontalBlobLocator::new(shape, config(8, 0.5)),
            Err(MotionError::Config { .. })
        ));
        assert!(matches!(
            HorizontalBlobLocator::new(shape, config(2, 1.5)),
            Err(MotionError::InvalidAlpha { .. })
        ));
        let bad_percentile = LocatorConfig {
            percentile: 120.0,
            ..config(2, 0.5)
        };
        assert!(HorizontalBlobLocator::new(shape, bad_percentile).is_err());

        let locator = HorizontalBlobLocator::new(shape, config(0, 0.5)).unwrap();
        assert_eq!(locator.history().shape(), shape);
    }
}
