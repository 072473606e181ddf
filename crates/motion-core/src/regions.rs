//! Connected foreground regions of a binary mask and their raster moments.
//!
//! Regions are 8-connected. A region covers everything inside its outer
//! boundary: enclosed background holes count toward its area and moments.

use std::collections::VecDeque;

use flowpulse_frame_model::{Field, Shape};
use serde::{Deserialize, Serialize};

/// Zeroth and first order raster moments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    /// Area.
    pub m00: f64,
    /// Sum of column coordinates.
    pub m10: f64,
    /// Sum of row coordinates.
    pub m01: f64,
}

impl Moments {
    pub fn add_pixel(&mut self, row: usize, col: usize) {
        self.m00 += 1.0;
        self.m10 += col as f64;
        self.m01 += row as f64;
    }

    /// `(row, col)` centroid, or `None` for an empty region.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 <= 0.0 {
            return None;
        }
        Some((self.m01 / self.m00, self.m10 / self.m00))
    }
}

/// Inclusive bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl BoundingBox {
    fn at(row: usize, col: usize) -> Self {
        Self {
            top: row,
            left: col,
            bottom: row,
            right: col,
        }
    }

    fn include(&mut self, row: usize, col: usize) {
        self.top = self.top.min(row);
        self.left = self.left.min(col);
        self.bottom = self.bottom.max(row);
        self.right = self.right.max(col);
    }

    pub fn rows(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn cols(&self) -> usize {
        self.right - self.left + 1
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.top..=self.bottom).contains(&row) && (self.left..=self.right).contains(&col)
    }
}

/// One connected foreground region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// First pixel reached in row-major scan order.
    pub first_pixel: (usize, usize),
    /// Foreground pixels belonging to the region.
    pub pixel_count: usize,
    /// Filled area, holes included.
    pub area: usize,
    pub bbox: BoundingBox,
    /// Moments of the filled region.
    pub moments: Moments,
}

impl Region {
    /// Centroid truncated to integer `(row, col)`.
    pub fn centroid(&self) -> (usize, usize) {
        // Filled regions are never empty, so m00 >= 1.
        let (row, col) = self.moments.centroid().unwrap_or((0.0, 0.0));
        (row as usize, col as usize)
    }
}

const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const NEIGHBORS_4: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

fn step(shape: Shape, row: usize, col: usize, (dr, dc): (isize, isize)) -> Option<(usize, usize)> {
    let r = row.checked_add_signed(dr)?;
    let c = col.checked_add_signed(dc)?;
    shape.contains(r, c).then_some((r, c))
}

/// All regions of `mask`, ordered by their first pixel in row-major order.
pub fn find_regions(mask: &Field<bool>) -> Vec<Region> {
    let shape = mask.shape();
    let mut labels: Field<u32> = Field::zeros(shape);
    let mut regions = Vec::new();
    let mut queue = VecDeque::new();

    for row in 0..shape.rows {
        for col in 0..shape.cols {
            if !mask[(row, col)] || labels[(row, col)] != 0 {
                continue;
            }
            let label = regions.len() as u32 + 1;
            labels[(row, col)] = label;
            queue.push_back((row, col));

            let mut pixel_count = 0;
            let mut bbox = BoundingBox::at(row, col);
            while let Some((r, c)) = queue.pop_front() {
                pixel_count += 1;
                bbox.include(r, c);
                for offset in NEIGHBORS_8 {
                    if let Some((nr, nc)) = step(shape, r, c, offset) {
                        if mask[(nr, nc)] && labels[(nr, nc)] == 0 {
                            labels[(nr, nc)] = label;
                            queue.push_back((nr, nc));
                        }
                    }
                }
            }

            let moments = filled_moments(&labels, label, bbox);
            regions.push(Region {
                first_pixel: (row, col),
                pixel_count,
                area: moments.m00 as usize,
                bbox,
                moments,
            });
        }
    }
    regions
}

/// Moments of everything inside the outer boundary of region `label`.
///
/// Floods the background from a one-cell frame around the bounding box
/// with 4-connectivity; only the region's own pixels act as walls. Cells the
/// flood cannot reach are inside the region.
fn filled_moments(labels: &Field<u32>, label: u32, bbox: BoundingBox) -> Moments {
    let padded = Shape::new(bbox.rows() + 2, bbox.cols() + 2);
    let is_wall = |pr: usize, pc: usize| {
        if pr == 0 || pc == 0 || pr == padded.rows - 1 || pc == padded.cols - 1 {
            return false;
        }
        labels[(bbox.top + pr - 1, bbox.left + pc - 1)] == label
    };

    let mut outside: Field<bool> = Field::zeros(padded);
    let mut queue = VecDeque::from([(0usize, 0usize)]);
    outside[(0, 0)] = true;
    while let Some((r, c)) = queue.pop_front() {
        for offset in NEIGHBORS_4 {
            if let Some((nr, nc)) = step(padded, r, c, offset) {
                if !outside[(nr, nc)] && !is_wall(nr, nc) {
                    outside[(nr, nc)] = true;
                    queue.push_back((nr, nc));
                }
            }
        }
    }

    let mut moments = Moments::default();
    for pr in 1..padded.rows - 1 {
        for pc in 1..padded.cols - 1 {
            if !outside[(pr, pc)] {
                moments.add_pixel(bbox.top + pr - 1, bbox.left + pc - 1);
            }
        }
    }
    moments
}

/// Region with the largest filled area. Ties go to the region found first
/// in row-major scan order.
pub fn largest_region(mask: &Field<bool>) -> Option<Region> {
    let mut best: Option<Region> = None;
    for region in find_regions(mask) {
        let larger = best
            .as_ref()
            .map_or(true, |current| region.area > current.area);
        if larger {
            best = Some(region);
        }
    }
    best
}
