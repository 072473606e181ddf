//! Smoothing and resizing used to build the flow pyramid.

use flowpulse_frame_model::{Field, Shape};

/// Normalized Gaussian kernel with `ksize` taps.
///
/// A non-positive `sigma` is derived from the kernel size.
pub(crate) fn gaussian_kernel(ksize: usize, sigma: f64) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (ksize as f64 - 1.0) * 0.5;
    let weights: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - center;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Mirror an out-of-range index without repeating the edge sample
/// (`gfedcb|abcdefgh|gfedcba`).
fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = index;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}

/// Separable Gaussian blur with reflect-101 borders.
pub(crate) fn gaussian_blur(src: &Field<f32>, ksize: usize, sigma: f64) -> Field<f32> {
    let shape = src.shape();
    if shape.is_empty() {
        return src.clone();
    }
    let (rows, cols) = (shape.rows, shape.cols);
    let kernel = gaussian_kernel(ksize, sigma);
    let radius = (ksize / 2) as isize;

    // Source column behind every cell of a padded row.
    let padded_cols: Vec<usize> = (0..cols + 2 * radius as usize)
        .map(|i| reflect_101(i as isize - radius, cols))
        .collect();
    let mut padded = vec![0.0f32; padded_cols.len()];

    let mut horizontal = Field::zeros(shape);
    for (row, out_row) in horizontal.cells_mut().chunks_exact_mut(cols).enumerate() {
        let line = src.row(row);
        for (p, &c) in padded.iter_mut().zip(&padded_cols) {
            *p = line[c];
        }
        for (col, out) in out_row.iter_mut().enumerate() {
            *out = kernel
                .iter()
                .zip(&padded[col..col + kernel.len()])
                .map(|(w, v)| w * v)
                .sum::<f32>();
        }
    }

    let mut out = Field::zeros(shape);
    for (row, out_row) in out.cells_mut().chunks_exact_mut(cols).enumerate() {
        for (i, w) in kernel.iter().enumerate() {
            let line = horizontal.row(reflect_101(row as isize + i as isize - radius, rows));
            for (o, v) in out_row.iter_mut().zip(line) {
                *o += w * v;
            }
        }
    }
    out
}

/// Source samples contributing to one destination coordinate.
#[derive(Debug, Clone, Copy)]
struct Tap {
    lo: usize,
    hi: usize,
    frac: f32,
}

/// Pixel-center aligned linear interpolation taps for one axis.
fn linear_taps(src_len: usize, dst_len: usize) -> Vec<Tap> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let f = (d as f64 + 0.5) * scale - 0.5;
            let base = f.floor();
            let mut lo = base as isize;
            let mut frac = (f - base) as f32;
            if lo < 0 {
                lo = 0;
                frac = 0.0;
            }
            if lo >= src_len as isize - 1 {
                lo = src_len as isize - 1;
                frac = 0.0;
            }
            let lo = lo as usize;
            Tap {
                lo,
                hi: (lo + 1).min(src_len - 1),
                frac,
            }
        })
        .collect()
}

/// Bilinear resize to `dst`.
pub(crate) fn resize_bilinear(src: &Field<f32>, dst: Shape) -> Field<f32> {
    if src.shape() == dst {
        return src.clone();
    }
    if src.shape().is_empty() || dst.is_empty() {
        return Field::zeros(dst);
    }
    let rows = linear_taps(src.rows(), dst.rows);
    let cols = linear_taps(src.cols(), dst.cols);

    Field::from_fn(dst, |row, col| {
        let ty = rows[row];
        let tx = cols[col];
        let top = src[(ty.lo, tx.lo)] * (1.0 - tx.frac) + src[(ty.lo, tx.hi)] * tx.frac;
        let bottom = src[(ty.hi, tx.lo)] * (1.0 - tx.frac) + src[(ty.hi, tx.hi)] * tx.frac;
        top * (1.0 - ty.frac) + bottom * ty.frac
    })
}
