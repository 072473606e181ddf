//! flowpulse Frame Model
//!
//! Defines the data contracts passed between pipeline stages:
//! - **Frame:** 8-bit grayscale or RGB video frame
//! - **Shape:** `(rows, cols)` geometry of a frame or field
//! - **Field:** dense row-major grid of per-pixel values
//!
//! Coordinates are always `(row, col)` with the origin at the top-left pixel.

pub mod field;
pub mod frame;

pub use field::*;
pub use frame::*;
