//! Exponentially decaying motion history.
//!
//! Every update blends the new field into the running state:
//!
//! ```text
//! H := alpha * X + (1 - alpha) * H
//! ```
//!
//! The blend is always computed in `f64`. [`Quantization`] controls whether
//! the stored state is also rounded to the element type after each update.

use flowpulse_common::error::{MotionError, MotionResult};
use flowpulse_frame_model::{Field, Shape};
use serde::{Deserialize, Serialize};

/// Numeric element types a history can be declared over.
///
/// Conversions from `f64` saturate at the type's bounds and truncate toward
/// zero for integers.
pub trait Sample: Copy + Default + PartialOrd + std::fmt::Debug {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_sample!(u8, u16, i32, f32, f64);

/// When the floating accumulator is rounded to the element type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantization {
    /// Keep full precision; quantize only in [`MotionHistory::snapshot`].
    #[default]
    Deferred,
    /// Round the state to `T` after every update. Integer histories then
    /// accumulate truncation bias over long streams.
    PerUpdate,
}

/// Running exponentially weighted average of a fixed-shape field.
#[derive(Debug, Clone)]
pub struct MotionHistory<T: Sample = f64> {
    shape: Shape,
    alpha: f64,
    quantization: Quantization,
    state: Field<f64>,
    updates: u64,
    _element: std::marker::PhantomData<T>,
}

impl<T: Sample> MotionHistory<T> {
    /// All-zero history. Fails with `InvalidAlpha` unless `0 <= alpha <= 1`.
    pub fn new(shape: Shape, alpha: f64) -> MotionResult<Self> {
        Self::with_quantization(shape, alpha, Quantization::default())
    }

    pub fn with_quantization(
        shape: Shape,
        alpha: f64,
        quantization: Quantization,
    ) -> MotionResult<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(MotionError::InvalidAlpha { alpha });
        }
        Ok(Self {
            shape,
            alpha,
            quantization,
            state: Field::zeros(shape),
            updates: 0,
            _element: std::marker::PhantomData,
        })
    }

    /// Blend `input` into the history and return the new state.
    ///
    /// A field of any other shape fails with `ShapeMismatch` and leaves the
    /// state untouched.
    pub fn update<S: Sample>(&mut self, input: &Field<S>) -> MotionResult<&Field<f64>> {
        input.ensure_shape(self.shape)?;

        let alpha = self.alpha;
        let keep = 1.0 - alpha;
        let per_update = self.quantization == Quantization::PerUpdate;
        for (h, x) in self.state.cells_mut().iter_mut().zip(input.cells()) {
            let blended = alpha * x.to_f64() + keep * *h;
            *h = if per_update {
                T::from_f64(blended).to_f64()
            } else {
                blended
            };
        }
        self.updates += 1;
        Ok(&self.state)
    }

    /// Zero the state in place.
    pub fn reset(&mut self) {
        self.state.cells_mut().fill(0.0);
        self.updates = 0;
    }

    /// Full-precision state.
    pub fn state(&self) -> &Field<f64> {
        &self.state
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.state.get(row, col)
    }

    /// State quantized to the declared element type.
    pub fn snapshot(&self) -> Field<T> {
        self.state.map(T::from_f64)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn quantization(&self) -> Quantization {
        self.quantization
    }

    /// Number of successful updates since construction or the last reset.
    pub fn updates(&self) -> u64 {
        self.updates
    }
}
