use std::f32::consts::TAU;

use flowpulse_common::config::{LocatorConfig, PipelineConfig};
use flowpulse_common::error::MotionError;
use flowpulse_frame_model::{Frame, Shape};
use flowpulse_motion_core::{Detection, FlowEstimator, HorizontalBlobLocator, MotionPipeline};
use image::{GrayImage, Luma, Rgb, RgbImage};

const SIZE: u32 = 64;
const SQUARE: u32 = 20;
const TOP: u32 = 22;

/// Dark frame with a bright textured square whose left edge sits at `left`.
/// The texture moves with the square.
fn square_frame(left: u32) -> GrayImage {
    GrayImage::from_fn(SIZE, SIZE, |x, y| {
        let inside = (left..left + SQUARE).contains(&x) && (TOP..TOP + SQUARE).contains(&y);
        let value = if inside {
            let tx = (x - left) as f32;
            let ty = (y - TOP) as f32;
            128.0 + 60.0 * (TAU * tx / 9.0).sin() + 40.0 * (TAU * ty / 11.0).cos()
        } else {
            20.0
        };
        Luma([value as u8])
    })
}

fn locator_config() -> LocatorConfig {
    LocatorConfig {
        edge_clip: 4,
        ..LocatorConfig::default()
    }
}

#[test]
fn identical_frames_report_no_motion() {
    let frame = Frame::from(square_frame(20));
    let mut estimator = FlowEstimator::new(&frame);
    let mut locator = HorizontalBlobLocator::for_estimator(&estimator, locator_config()).unwrap();

    let flow = estimator.update(&frame).unwrap();
    assert_eq!(flow.shape(), Shape::new(64, 64));
    assert!(flow.mag.cells().iter().all(|m| m.abs() < 1e-6));

    let result = locator.compute(flow);
    assert!(matches!(result, Err(MotionError::NoMotionDetected)));
}

#[test]
fn identical_color_frames_report_no_motion() {
    let rgb = RgbImage::from_fn(SIZE, SIZE, |x, y| Rgb([(x * 3) as u8, (y * 2) as u8, 90]));
    let frame = Frame::from(rgb);
    let mut estimator = FlowEstimator::new(&frame);
    let mut locator = HorizontalBlobLocator::for_estimator(&estimator, locator_config()).unwrap();

    let flow = estimator.update(&frame).unwrap();
    assert!(matches!(
        locator.compute(flow),
        Err(MotionError::NoMotionDetected)
    ));
}

#[test]
fn translated_square_moves_right_and_is_located() {
    let prev = Frame::from(square_frame(20));
    let next = Frame::from(square_frame(22));
    let mut estimator = FlowEstimator::new(&prev);
    let mut locator = HorizontalBlobLocator::for_estimator(&estimator, locator_config()).unwrap();

    let flow = estimator.update(&next).unwrap();

    // Interior of the square in both frames.
    let (mut sum_dx, mut sum_dy, mut rightward, mut count) = (0.0f64, 0.0f64, 0usize, 0usize);
    for row in 26..38 {
        for col in 26..38 {
            sum_dx += flow.dx[(row, col)] as f64;
            sum_dy += flow.dy[(row, col)] as f64;
            let ang = flow.ang[(row, col)];
            if ang.cos() > 0.7 {
                rightward += 1;
            }
            count += 1;
        }
    }
    let mean_dx = sum_dx / count as f64;
    let mean_dy = sum_dy / count as f64;
    assert!(mean_dx > 0.5, "mean dx = {mean_dx}");
    let cos = mean_dx / mean_dx.hypot(mean_dy);
    assert!(cos > 0.9, "mean direction cosine = {cos}");
    assert!(rightward * 10 > count * 6, "{rightward} of {count} cells point right");

    let outcome = locator.compute(flow).unwrap();
    let (row, col) = outcome.frame_location;
    assert!((TOP as usize..(TOP + SQUARE) as usize).contains(&row), "row {row}");
    assert!((20..42).contains(&col), "col {col}");
    assert_eq!(
        outcome.location,
        (row - locator_config().edge_clip, col - locator_config().edge_clip)
    );
    assert!(outcome.intensity > 0.0);
    assert_eq!(estimator.visualization().dimensions(), (SIZE, SIZE));
}

#[test]
fn pipeline_tracks_a_sliding_square() {
    flowpulse_common::logging::init_default_logging();
    let config = PipelineConfig {
        locator: locator_config(),
        hold_frames: 3,
        ..PipelineConfig::default()
    };
    let mut pipeline = MotionPipeline::new(&Frame::from(square_frame(16)), &config).unwrap();

    for step in 1..=5u32 {
        let frame = Frame::from(square_frame(16 + 2 * step));
        let report = pipeline.process(&frame).unwrap();
        assert_eq!(report.frame_index, step as u64);
        let Detection::Detected(outcome) = report.detection else {
            panic!("frame {step}: expected a detection, got {:?}", report.detection);
        };
        let (row, col) = outcome.frame_location;
        assert!((TOP as usize..(TOP + SQUARE) as usize).contains(&row), "row {row}");
        assert!((16..46).contains(&col), "col {col}");
    }

    // The square stops; the decaying history still yields a location.
    let last = Frame::from(square_frame(26));
    let report = pipeline.process(&last).unwrap();
    assert!(report.detection.outcome().is_some());

    let stats = pipeline.stats();
    assert_eq!(stats.frames_processed, 6);
    assert_eq!(stats.rejected, 0);
    assert!(stats.detected >= 5);
}
