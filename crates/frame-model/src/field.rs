//! Dense per-pixel fields.
//!
//! A [`Field`] is a row-major grid with a fixed [`Shape`]. Flow components,
//! motion history and binary masks are all fields; only the element type
//! differs.

use std::ops::{Index, IndexMut};

use flowpulse_common::error::{MotionError, MotionResult};
use serde::{Deserialize, Serialize};

/// Geometry of a frame or field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of cells.
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// `(rows, cols)` tuple, the form used in error reports.
    pub const fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Shape left after removing `margin` cells from every side.
    ///
    /// Returns `None` when nothing would remain.
    pub fn shrink(&self, margin: usize) -> Option<Shape> {
        let rows = self.rows.checked_sub(2 * margin)?;
        let cols = self.cols.checked_sub(2 * margin)?;
        let shape = Shape::new(rows, cols);
        (!shape.is_empty()).then_some(shape)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self::new(rows, cols)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A row-major grid of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field<T> {
    shape: Shape,
    cells: Vec<T>,
}

impl<T: Copy> Field<T> {
    /// A field with every cell set to `value`.
    pub fn filled(shape: Shape, value: T) -> Self {
        Self {
            shape,
            cells: vec![value; shape.len()],
        }
    }

    /// Wrap existing row-major cells. Fails if the length disagrees with `shape`.
    pub fn from_vec(shape: Shape, cells: Vec<T>) -> MotionResult<Self> {
        if cells.len() != shape.len() {
            return Err(MotionError::config(format!(
                "field of shape {shape} needs {} cells, got {}",
                shape.len(),
                cells.len()
            )));
        }
        Ok(Self { shape, cells })
    }

    /// Build a field by evaluating `f(row, col)` for every cell.
    pub fn from_fn(shape: Shape, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(shape.len());
        for row in 0..shape.rows {
            for col in 0..shape.cols {
                cells.push(f(row, col));
            }
        }
        Self { shape, cells }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if !self.shape.contains(row, col) {
            return None;
        }
        Some(self.cells[row * self.shape.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let cols = self.shape.cols;
        self.cells[row * cols + col] = value;
    }

    /// Value at `(row, col)` with coordinates clamped into the field.
    pub fn clamped(&self, row: isize, col: isize) -> T {
        let r = row.clamp(0, self.shape.rows as isize - 1) as usize;
        let c = col.clamp(0, self.shape.cols as isize - 1) as usize;
        self.cells[r * self.shape.cols + c]
    }

    /// One row as a slice.
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.shape.cols;
        &self.cells[start..start + self.shape.cols]
    }

    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> Field<U> {
        Field {
            shape: self.shape,
            cells: self.cells.iter().copied().map(f).collect(),
        }
    }

    /// Combine two same-shaped fields cell by cell.
    pub fn zip_map<U: Copy, V: Copy>(
        &self,
        other: &Field<U>,
        mut f: impl FnMut(T, U) -> V,
    ) -> MotionResult<Field<V>> {
        other.ensure_shape(self.shape)?;
        Ok(Field {
            shape: self.shape,
            cells: self
                .cells
                .iter()
                .zip(other.cells.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Copy of the interior left after removing `margin` cells from every
    /// side. A margin of zero returns a full copy.
    pub fn crop(&self, margin: usize) -> Option<Field<T>> {
        let shape = self.shape.shrink(margin)?;
        let mut cells = Vec::with_capacity(shape.len());
        for row in margin..margin + shape.rows {
            cells.extend_from_slice(&self.row(row)[margin..margin + shape.cols]);
        }
        Some(Field { shape, cells })
    }

    /// Fail with `ShapeMismatch` unless this field has shape `expected`.
    pub fn ensure_shape(&self, expected: Shape) -> MotionResult<()> {
        if self.shape != expected {
            return Err(MotionError::shape_mismatch(
                expected.dims(),
                self.shape.dims(),
            ));
        }
        Ok(())
    }
}

impl<T: Copy + Default> Field<T> {
    pub fn zeros(shape: Shape) -> Self {
        Self::filled(shape, T::default())
    }
}

impl<T: Copy + PartialOrd> Field<T> {
    /// Smallest and largest cell, or `None` for an empty field.
    pub fn min_max(&self) -> Option<(T, T)> {
        let first = *self.cells.first()?;
        Some(self.cells.iter().fold((first, first), |(lo, hi), &v| {
            (
                if v < lo { v } else { lo },
                if v > hi { v } else { hi },
            )
        }))
    }
}

impl<T> Index<(usize, usize)> for Field<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.shape.rows && col < self.shape.cols);
        &self.cells[row * self.shape.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Field<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.shape.rows && col < self.shape.cols);
        &mut self.cells[row * self.shape.cols + col]
    }
}
