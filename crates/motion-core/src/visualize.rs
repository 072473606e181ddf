//! Hue/value rendering of a flow field for display.
//!
//! Hue encodes direction (OpenCV-style 8-bit hue, `[0, 180)`), value encodes
//! magnitude normalized to the frame's own range, saturation stays at 255.

use image::{Rgb, RgbImage};

use crate::flow::FlowField;

/// Write the HSV encoding of `flow` into `hsv` and its RGB conversion into
/// `out`. Both buffers must already have the flow's geometry.
pub fn render_flow(flow: &FlowField, hsv: &mut RgbImage, out: &mut RgbImage) {
    let (lo, hi) = flow.mag.min_max().unwrap_or((0.0, 0.0));
    let span = hi - lo;

    for row in 0..flow.mag.rows() {
        for col in 0..flow.mag.cols() {
            let mag = flow.mag[(row, col)];
            let hue = (flow.ang[(row, col)].to_degrees() / 2.0) as u8;
            let val = if span > 0.0 {
                ((mag - lo) * 255.0 / span).round().clamp(0.0, 255.0) as u8
            } else {
                0
            };
            let (x, y) = (col as u32, row as u32);
            let px = hsv.get_pixel_mut(x, y);
            px[0] = hue;
            px[2] = val;
            let [h, s, v] = px.0;
            out.put_pixel(x, y, Rgb(hsv_to_rgb(h, s, v)));
        }
    }
}

/// Convert one 8-bit HSV pixel (hue in `[0, 180)`) to RGB.
pub fn hsv_to_rgb(h: u8, s: u8, v: u8) -> [u8; 3] {
    let hue = (h as f32 * 2.0) % 360.0;
    let s = s as f32 / 255.0;
    let v = v as f32;

    let sector = hue / 60.0;
    let i = sector.floor() as u32 % 6;
    let f = sector - sector.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [r, g, b].map(|c| c.round().clamp(0.0, 255.0) as u8)
}
