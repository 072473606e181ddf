//! Dense two-frame optical flow by polynomial expansion.
//!
//! # Algorithm
//!
//! 1. **Pyramid**: both frames are Gaussian-smoothed and downscaled by
//!    `pyr_scale` per level, stopping before any side drops below 32 pixels.
//! 2. **Expansion**: every pixel neighborhood is approximated by a quadratic
//!    polynomial, fitted by Gaussian-weighted least squares.
//! 3. **Displacement**: comparing the two expansions at the currently
//!    estimated displacement gives per-pixel normal equations, which are box
//!    averaged over the window and solved for the flow update.
//! 4. **Refinement**: step 3 repeats `iterations` times per level; the
//!    result seeds the next finer level.

use flowpulse_common::config::FlowParams;
use flowpulse_frame_model::{Field, Shape};

use crate::resample::{gaussian_blur, resize_bilinear};

/// Coarsest pyramid level may not be smaller than this on either axis.
const MIN_LEVEL_SIZE: f64 = 32.0;

/// Attenuation applied to the five outermost rows and columns, where the
/// expansion sees replicated border pixels.
const BORDER_WEIGHTS: [f32; 5] = [0.14, 0.14, 0.4472, 0.4472, 0.4472];

/// Regularizer added to the normal-equation determinant.
const DET_EPSILON: f64 = 1e-3;

/// Local quadratic model `c + bx·x + by·y + axx·x² + ayy·y² + axy·x·y`.
/// The constant term is never needed and is not stored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Poly {
    pub by: f32,
    pub bx: f32,
    pub ayy: f32,
    pub axx: f32,
    pub axy: f32,
}

/// Per-pixel normal equations `[gyy gxy; gxy gxx]·(dy, dx) = (hy, hx)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Normal {
    gyy: f32,
    gxy: f32,
    gxx: f32,
    hy: f32,
    hx: f32,
}

impl Normal {
    fn to_array(self) -> [f64; 5] {
        [
            self.gyy as f64,
            self.gxy as f64,
            self.gxx as f64,
            self.hy as f64,
            self.hx as f64,
        ]
    }
}

/// Separable Gaussian weights and the entries of the inverse normal matrix
/// of the polynomial fit.
struct PolyBasis {
    n: usize,
    g: Vec<f32>,
    xg: Vec<f32>,
    xxg: Vec<f32>,
    ig11: f64,
    ig03: f64,
    ig33: f64,
    ig55: f64,
}

impl PolyBasis {
    fn new(n: usize, sigma: f64) -> Self {
        let sigma = if sigma < f32::EPSILON as f64 {
            n as f64 * 0.3
        } else {
            sigma
        };

        let raw: Vec<f64> = (0..=n)
            .map(|k| (-((k * k) as f64) / (2.0 * sigma * sigma)).exp())
            .collect();
        let total = raw[0] + 2.0 * raw[1..].iter().sum::<f64>();
        let g: Vec<f32> = raw.iter().map(|w| (w / total) as f32).collect();
        let xg: Vec<f32> = g.iter().enumerate().map(|(k, w)| k as f32 * w).collect();
        let xxg: Vec<f32> = g
            .iter()
            .enumerate()
            .map(|(k, w)| (k * k) as f32 * w)
            .collect();

        // Only four distinct entries survive in the normal matrix of the
        // basis (1, x, y, x², y², xy) under a symmetric weight.
        let (mut g00, mut g11, mut g33, mut g55) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        let ni = n as isize;
        for y in -ni..=ni {
            for x in -ni..=ni {
                let w = g[y.unsigned_abs()] as f64 * g[x.unsigned_abs()] as f64;
                let (xf, yf) = (x as f64, y as f64);
                g00 += w;
                g11 += w * xf * xf;
                g33 += w * xf * xf * xf * xf;
                g55 += w * xf * xf * yf * yf;
            }
        }

        // Closed-form inverse of the coupled (1, x², y²) block.
        let coupled = g00 * (g33 + g55) - 2.0 * g11 * g11;
        Self {
            n,
            g,
            xg,
            xxg,
            ig11: 1.0 / g11,
            ig03: -g11 / coupled,
            ig33: (g00 * g33 - g11 * g11) / ((g33 - g55) * coupled),
            ig55: 1.0 / g55,
        }
    }
}

/// Fit the local quadratic model at every pixel. Borders are replicated.
fn poly_expand(src: &Field<f32>, basis: &PolyBasis) -> Field<Poly> {
    let shape = src.shape();
    let mut out = Field::filled(shape, Poly::default());
    if shape.is_empty() {
        return out;
    }
    let (rows, cols) = (shape.rows, shape.cols);
    let n = basis.n;
    let g0 = basis.g[0] as f64;

    // Vertical moments (weights 1, y, y²) of one row, with `n` replicated
    // cells on either side for the horizontal pass.
    let mut vertical = vec![[0.0f32; 3]; cols + 2 * n];

    for (row, out_row) in out.cells_mut().chunks_exact_mut(cols).enumerate() {
        let inner = &mut vertical[n..n + cols];
        for (acc, &v) in inner.iter_mut().zip(src.row(row)) {
            *acc = [v * basis.g[0], 0.0, 0.0];
        }
        for k in 1..=n {
            let up = src.row(row.saturating_sub(k));
            let down = src.row((row + k).min(rows - 1));
            let (g, xg, xxg) = (basis.g[k], basis.xg[k], basis.xxg[k]);
            for ((acc, &u), &d) in inner.iter_mut().zip(up).zip(down) {
                acc[0] += g * (u + d);
                acc[1] += xg * (d - u);
                acc[2] += xxg * (u + d);
            }
        }
        let (first, last) = (vertical[n], vertical[n + cols - 1]);
        vertical[..n].fill(first);
        vertical[n + cols..].fill(last);

        // Horizontal pass combines into the six moments of the fit.
        for (col, poly) in out_row.iter_mut().enumerate() {
            let center = vertical[col + n];
            let mut b1 = center[0] as f64 * g0;
            let mut b2 = 0.0f64;
            let mut b3 = center[1] as f64 * g0;
            let mut b4 = 0.0f64;
            let mut b5 = center[2] as f64 * g0;
            let mut b6 = 0.0f64;
            for k in 1..=n {
                let left = vertical[col + n - k];
                let right = vertical[col + n + k];
                let (g, xg, xxg) = (
                    basis.g[k] as f64,
                    basis.xg[k] as f64,
                    basis.xxg[k] as f64,
                );
                let sum0 = (right[0] + left[0]) as f64;
                b1 += sum0 * g;
                b4 += sum0 * xxg;
                b2 += (right[0] - left[0]) as f64 * xg;
                b3 += (right[1] + left[1]) as f64 * g;
                b6 += (right[1] - left[1]) as f64 * xg;
                b5 += (right[2] + left[2]) as f64 * g;
            }
            *poly = Poly {
                by: (b3 * basis.ig11) as f32,
                bx: (b2 * basis.ig11) as f32,
                ayy: (b1 * basis.ig03 + b5 * basis.ig33) as f32,
                axx: (b1 * basis.ig03 + b4 * basis.ig33) as f32,
                axy: (b6 * basis.ig55) as f32,
            };
        }
    }
    out
}

/// Bilinearly sample `r1` at `(row + fy, col + fx)`, replicating the last
/// row and column.
fn sample_poly(r1: &Field<Poly>, row: usize, col: usize, fy: f32, fx: f32) -> Poly {
    let a00 = (1.0 - fx) * (1.0 - fy);
    let a01 = fx * (1.0 - fy);
    let a10 = (1.0 - fx) * fy;
    let a11 = fx * fy;
    let below = (row + 1).min(r1.rows() - 1);
    let right = (col + 1).min(r1.cols() - 1);
    let p00 = r1[(row, col)];
    let p01 = r1[(row, right)];
    let p10 = r1[(below, col)];
    let p11 = r1[(below, right)];
    let mix = |f: fn(&Poly) -> f32| a00 * f(&p00) + a01 * f(&p01) + a10 * f(&p10) + a11 * f(&p11);
    Poly {
        by: mix(|p| p.by),
        bx: mix(|p| p.bx),
        ayy: mix(|p| p.ayy),
        axx: mix(|p| p.axx),
        axy: mix(|p| p.axy),
    }
}

fn border_scale(index: usize, len: usize) -> f32 {
    let near = if index < BORDER_WEIGHTS.len() {
        BORDER_WEIGHTS[index]
    } else {
        1.0
    };
    let far = if index + BORDER_WEIGHTS.len() >= len {
        BORDER_WEIGHTS[len - index - 1]
    } else {
        1.0
    };
    near * far
}

/// Normal equations comparing `r0` with `r1` displaced by the current flow,
/// written into `out`.
fn update_matrices(
    r0: &Field<Poly>,
    r1: &Field<Poly>,
    dx: &Field<f32>,
    dy: &Field<f32>,
    out: &mut Field<Normal>,
) {
    let shape = r0.shape();
    let (height, width) = (shape.rows, shape.cols);
    let edge = BORDER_WEIGHTS.len();

    let rows = r0
        .cells()
        .chunks_exact(width)
        .zip(dx.cells().chunks_exact(width))
        .zip(dy.cells().chunks_exact(width))
        .zip(out.cells_mut().chunks_exact_mut(width));

    for (row, (((p0_row, dx_row), dy_row), out_row)) in rows.enumerate() {
        let border_row = row < edge || row + edge >= height;
        for (col, normal) in out_row.iter_mut().enumerate() {
            let p0 = p0_row[col];
            let (fdx, fdy) = (dx_row[col], dy_row[col]);
            let fx = col as f32 + fdx;
            let fy = row as f32 + fdy;
            let x1 = fx.floor();
            let y1 = fy.floor();

            // The last row and column are sampled without a right/lower
            // neighbour, so an unmoved pixel always compares against itself.
            let inside =
                x1 >= 0.0 && y1 >= 0.0 && (x1 as usize) < width && (y1 as usize) < height;

            let (mut hy, mut hx, mut ayy, mut axx, mut axy);
            if inside {
                let p1 = sample_poly(r1, y1 as usize, x1 as usize, fy - y1, fx - x1);
                hy = p1.by;
                hx = p1.bx;
                ayy = (p0.ayy + p1.ayy) * 0.5;
                axx = (p0.axx + p1.axx) * 0.5;
                axy = (p0.axy + p1.axy) * 0.25;
            } else {
                hy = 0.0;
                hx = 0.0;
                ayy = p0.ayy;
                axx = p0.axx;
                axy = p0.axy * 0.5;
            }

            hy = (p0.by - hy) * 0.5 + ayy * fdy + axy * fdx;
            hx = (p0.bx - hx) * 0.5 + axy * fdy + axx * fdx;

            if border_row || col < edge || col + edge >= width {
                let scale = border_scale(col, width) * border_scale(row, height);
                hy *= scale;
                hx *= scale;
                ayy *= scale;
                axx *= scale;
                axy *= scale;
            }

            *normal = Normal {
                gyy: ayy * ayy + axy * axy,
                gxy: (ayy + axx) * axy,
                gxx: axx * axx + axy * axy,
                hy: ayy * hy + axy * hx,
                hx: axy * hy + axx * hx,
            };
        }
    }
}

/// Add `weight` times every normal of `src` onto the matching sums.
fn accumulate(sums: &mut [[f64; 5]], src: &[Normal], weight: f64) {
    for (acc, m) in sums.iter_mut().zip(src) {
        for (a, v) in acc.iter_mut().zip(m.to_array()) {
            *a += weight * v;
        }
    }
}

/// Box-average the normal equations over a `window`-sized square
/// (replicated borders) and solve each pixel for `(dx, dy)`.
///
/// Column sums slide down one row at a time and the window sum slides
/// along each row, so the cost per pixel does not depend on `window`.
fn solve_flow(matrices: &Field<Normal>, window: usize, dx: &mut Field<f32>, dy: &mut Field<f32>) {
    let shape = matrices.shape();
    let (rows, cols) = (shape.rows, shape.cols);
    let radius = window / 2;
    let side = 2 * radius + 1;
    let scale = 1.0 / (side * side) as f64;

    // Column sums over the rows of the current window, padded by `radius`
    // replicated columns on either side.
    let mut columns = vec![[0.0f64; 5]; cols + 2 * radius];
    accumulate(&mut columns[radius..radius + cols], matrices.row(0), (radius + 1) as f64);
    for k in 1..=radius {
        accumulate(&mut columns[radius..radius + cols], matrices.row(k.min(rows - 1)), 1.0);
    }

    let out_rows = dx
        .cells_mut()
        .chunks_exact_mut(cols)
        .zip(dy.cells_mut().chunks_exact_mut(cols));
    for (row, (dx_row, dy_row)) in out_rows.enumerate() {
        let (first, last) = (columns[radius], columns[radius + cols - 1]);
        columns[..radius].fill(first);
        columns[radius + cols..].fill(last);

        let mut acc = [0.0f64; 5];
        for sums in &columns[..side] {
            for (a, v) in acc.iter_mut().zip(sums) {
                *a += v;
            }
        }

        for col in 0..cols {
            let [gyy, gxy, gxx, hy, hx] = acc.map(|v| v * scale);
            let idet = 1.0 / (gyy * gxx - gxy * gxy + DET_EPSILON);
            dx_row[col] = ((gyy * hx - gxy * hy) * idet) as f32;
            dy_row[col] = ((gxx * hy - gxy * hx) * idet) as f32;

            if col + 1 < cols {
                let (enter, leave) = (columns[col + side], columns[col]);
                for ((a, e), l) in acc.iter_mut().zip(enter).zip(leave) {
                    *a += e - l;
                }
            }
        }

        if row + 1 < rows {
            let inner = &mut columns[radius..radius + cols];
            accumulate(inner, matrices.row((row + radius + 1).min(rows - 1)), 1.0);
            accumulate(inner, matrices.row(row.saturating_sub(radius)), -1.0);
        }
    }
}

/// Number of pyramid levels above the base that keep every side at least
/// [`MIN_LEVEL_SIZE`] pixels.
fn usable_levels(shape: Shape, params: &FlowParams) -> usize {
    let mut scale = 1.0;
    let mut levels = 0;
    while levels < params.levels {
        scale *= params.pyr_scale;
        if (shape.cols as f64) * scale < MIN_LEVEL_SIZE || (shape.rows as f64) * scale < MIN_LEVEL_SIZE
        {
            break;
        }
        levels += 1;
    }
    levels
}

/// Smoothed and resized copy of `image` for one pyramid level.
fn level_image(image: &Field<f32>, scale: f64, level_shape: Shape) -> Field<f32> {
    let sigma = (1.0 / scale - 1.0) * 0.5;
    let ksize = (((sigma * 5.0).round() as usize) | 1).max(3);
    let smoothed = gaussian_blur(image, ksize, sigma);
    resize_bilinear(&smoothed, level_shape)
}

/// Dense flow `(dx, dy)` such that `prev(row, col) ≈ next(row + dy, col + dx)`.
///
/// Both inputs must share one shape; the result has that shape too.
pub fn dense_flow(
    prev: &Field<f32>,
    next: &Field<f32>,
    params: &FlowParams,
) -> (Field<f32>, Field<f32>) {
    let shape = prev.shape();
    debug_assert_eq!(shape, next.shape());
    if shape.is_empty() {
        return (Field::zeros(shape), Field::zeros(shape));
    }

    let basis = PolyBasis::new(params.poly_n, params.poly_sigma);
    let levels = usable_levels(shape, params);
    let mut coarser: Option<(Field<f32>, Field<f32>)> = None;

    for level in (0..=levels).rev() {
        let scale = params.pyr_scale.powi(level as i32);
        let level_shape = Shape::new(
            ((shape.rows as f64) * scale).round() as usize,
            ((shape.cols as f64) * scale).round() as usize,
        );

        let (mut dx, mut dy) = match coarser.take() {
            Some((cdx, cdy)) => {
                let grow = (1.0 / params.pyr_scale) as f32;
                (
                    resize_bilinear(&cdx, level_shape).map(|v| v * grow),
                    resize_bilinear(&cdy, level_shape).map(|v| v * grow),
                )
            }
            None => (Field::zeros(level_shape), Field::zeros(level_shape)),
        };

        let r0 = poly_expand(&level_image(prev, scale, level_shape), &basis);
        let r1 = poly_expand(&level_image(next, scale, level_shape), &basis);

        let mut matrices = Field::filled(level_shape, Normal::default());
        update_matrices(&r0, &r1, &dx, &dy, &mut matrices);
        for iteration in 0..params.iterations {
            solve_flow(&matrices, params.win_size, &mut dx, &mut dy);
            if iteration + 1 < params.iterations {
                update_matrices(&r0, &r1, &dx, &dy, &mut matrices);
            }
        }

        tracing::trace!(level, rows = level_shape.rows, cols = level_shape.cols, "flow level solved");
        coarser = Some((dx, dy));
    }

    coarser.unwrap_or_else(|| (Field::zeros(shape), Field::zeros(shape)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(shape: Shape, shift_x: f32, shift_y: f32) -> Field<f32> {
        Field::from_fn(shape, |row, col| {
            let x = col as f32 - shift_x;
            let y = row as f32 - shift_y;
            128.0 + 50.0 * (x / 4.0).sin() + 50.0 * (y / 5.0).cos()
        })
    }

    fn interior_mean(field: &Field<f32>, margin: usize) -> f32 {
        let inner = field.crop(margin).unwrap();
        inner.cells().iter().sum::<f32>() / inner.cells().len() as f32
    }

    #[test]
    fn basis_inverse_entries_are_finite() {
        let basis = PolyBasis::new(5, 1.2);
        for v in [basis.ig11, basis.ig03, basis.ig33, basis.ig55] {
            assert!(v.is_finite());
        }
        let total = basis.g[0] + 2.0 * basis.g[1..].iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn expansion_recovers_linear_gradient() {
        // I = 3x + 2y has bx = 3, by = 2 and no quadratic terms.
        let shape = Shape::new(24, 24);
        let src = Field::from_fn(shape, |row, col| 3.0 * col as f32 + 2.0 * row as f32);
        let poly = poly_expand(&src, &PolyBasis::new(5, 1.2));
        let p = poly[(12, 12)];
        assert!((p.bx - 3.0).abs() < 1e-3, "bx = {}", p.bx);
        assert!((p.by - 2.0).abs() < 1e-3, "by = {}", p.by);
        assert!(p.axx.abs() < 1e-3 && p.ayy.abs() < 1e-3 && p.axy.abs() < 1e-3);
    }

    #[test]
    fn expansion_recovers_quadratic_terms() {
        let shape = Shape::new(24, 24);
        let src = Field::from_fn(shape, |row, col| {
            let (x, y) = (col as f32 - 12.0, row as f32 - 12.0);
            0.5 * x * x - 0.25 * y * y + 0.75 * x * y
        });
        let poly = poly_expand(&src, &PolyBasis::new(5, 1.2));
        let p = poly[(12, 12)];
        assert!((p.axx - 0.5).abs() < 1e-2, "axx = {}", p.axx);
        assert!((p.ayy + 0.25).abs() < 1e-2, "ayy = {}", p.ayy);
        assert!((p.axy - 0.75).abs() < 1e-2, "axy = {}", p.axy);
    }

    #[test]
    fn identical_frames_have_zero_flow() {
        let shape = Shape::new(48, 48);
        let frame = texture(shape, 0.0, 0.0);
        let (dx, dy) = dense_flow(&frame, &frame, &FlowParams::default());
        assert!(dx.cells().iter().all(|v| v.abs() < 1e-3));
        assert!(dy.cells().iter().all(|v| v.abs() < 1e-3));
    }

    #[test]
    fn horizontal_shift_is_recovered() {
        let shape = Shape::new(64, 64);
        let prev = texture(shape, 0.0, 0.0);
        let next = texture(shape, 1.0, 0.0);
        let (dx, dy) = dense_flow(&prev, &next, &FlowParams::default());

        let mean_dx = interior_mean(&dx, 12);
        let mean_dy = interior_mean(&dy, 12);
        assert!((mean_dx - 1.0).abs() < 0.25, "mean dx = {mean_dx}");
        assert!(mean_dy.abs() < 0.25, "mean dy = {mean_dy}");
    }

    #[test]
    fn vertical_shift_is_recovered() {
        let shape = Shape::new(64, 64);
        let prev = texture(shape, 0.0, 0.0);
        let next = texture(shape, 0.0, -1.0);
        let (dx, dy) = dense_flow(&prev, &next, &FlowParams::default());

        let mean_dx = interior_mean(&dx, 12);
        let mean_dy = interior_mean(&dy, 12);
        assert!(mean_dx.abs() < 0.25, "mean dx = {mean_dx}");
        assert!((mean_dy + 1.0).abs() < 0.25, "mean dy = {mean_dy}");
    }

    /// Per-pixel box average over clamped taps.
    fn direct_box_solve(matrices: &Field<Normal>, window: usize) -> (Field<f32>, Field<f32>) {
        let shape = matrices.shape();
        let radius = (window / 2) as isize;
        let scale = 1.0 / ((2 * radius + 1) * (2 * radius + 1)) as f64;
        let mut dx = Field::zeros(shape);
        let mut dy = Field::zeros(shape);
        for row in 0..shape.rows {
            for col in 0..shape.cols {
                let mut acc = [0.0f64; 5];
                for i in -radius..=radius {
                    for j in -radius..=radius {
                        let m = matrices.clamped(row as isize + i, col as isize + j);
                        for (a, v) in acc.iter_mut().zip(m.to_array()) {
                            *a += v;
                        }
                    }
                }
                let [gyy, gxy, gxx, hy, hx] = acc.map(|v| v * scale);
                let idet = 1.0 / (gyy * gxx - gxy * gxy + DET_EPSILON);
                dx[(row, col)] = ((gyy * hx - gxy * hy) * idet) as f32;
                dy[(row, col)] = ((gxx * hy - gxy * hx) * idet) as f32;
            }
        }
        (dx, dy)
    }

    fn assert_close(a: &Field<f32>, b: &Field<f32>, tolerance: f32) {
        assert_eq!(a.shape(), b.shape());
        for (i, (x, y)) in a.cells().iter().zip(b.cells()).enumerate() {
            assert!((x - y).abs() <= tolerance * (1.0 + y.abs()), "cell {i}: {x} vs {y}");
        }
    }

    #[test]
    fn sliding_box_matches_direct_average() {
        // Odd sizes and a window wider than the field exercise every
        // replicated-border case.
        for (shape, window) in [
            (Shape::new(23, 31), 7),
            (Shape::new(9, 5), 7),
            (Shape::new(1, 12), 3),
            (Shape::new(6, 6), 15),
        ] {
            let matrices = Field::from_fn(shape, |row, col| {
                let t = (row * 31 + col * 17) as f32;
                Normal {
                    gyy: 1.0 + (t * 0.13).sin().abs(),
                    gxy: 0.3 * (t * 0.07).cos(),
                    gxx: 1.0 + (t * 0.11).cos().abs(),
                    hy: (t * 0.05).sin(),
                    hx: (t * 0.09).cos(),
                }
            });
            let (expected_dx, expected_dy) = direct_box_solve(&matrices, window);
            let mut dx = Field::zeros(shape);
            let mut dy = Field::zeros(shape);
            solve_flow(&matrices, window, &mut dx, &mut dy);
            assert_close(&dx, &expected_dx, 1e-5);
            assert_close(&dy, &expected_dy, 1e-5);
        }
    }

    #[test]
    fn expansion_replicates_borders() {
        // A ramp along x is constant under vertical replication, so the
        // top and bottom rows see the same gradient as the middle.
        let shape = Shape::new(16, 20);
        let src = Field::from_fn(shape, |_, col| 2.0 * col as f32);
        let poly = poly_expand(&src, &PolyBasis::new(5, 1.2));
        for row in [0, 8, 15] {
            let p = poly[(row, 10)];
            assert!((p.bx - 2.0).abs() < 1e-3, "row {row}: bx = {}", p.bx);
            assert!(p.by.abs() < 1e-3, "row {row}: by = {}", p.by);
        }
        // At the left edge the replicated column flattens the ramp.
        assert!(poly[(8, 0)].bx < 2.0);
        assert!(poly[(8, 0)].bx > 0.0);
    }

    #[test]
    fn pyramid_depth_respects_minimum_size() {
        let params = FlowParams::default();
        assert_eq!(usable_levels(Shape::new(64, 64), &params), 1);
        assert_eq!(usable_levels(Shape::new(480, 640), &params), 3);
        assert_eq!(usable_levels(Shape::new(20, 20), &params), 0);
        assert_eq!(usable_levels(Shape::new(4096, 4096), &params), 5);
    }
}
