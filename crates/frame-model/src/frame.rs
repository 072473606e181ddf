//! Video frames as delivered by the capture collaborator.

use image::{DynamicImage, GrayImage, RgbImage};

use crate::field::{Field, Shape};

/// An 8-bit video frame, either single-channel or RGB.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl Frame {
    /// Frame geometry as `(rows, cols)`.
    pub fn shape(&self) -> Shape {
        let (width, height) = match self {
            Frame::Gray(img) => img.dimensions(),
            Frame::Rgb(img) => img.dimensions(),
        };
        Shape::new(height as usize, width as usize)
    }

    pub fn channels(&self) -> usize {
        match self {
            Frame::Gray(_) => 1,
            Frame::Rgb(_) => 3,
        }
    }

    /// Single-channel version of this frame. Grayscale frames are cloned as-is.
    pub fn to_gray(&self) -> GrayImage {
        match self {
            Frame::Gray(img) => img.clone(),
            Frame::Rgb(img) => image::imageops::grayscale(img),
        }
    }

    /// Grayscale intensities widened to `f32`.
    pub fn to_gray_field(&self) -> Field<f32> {
        luma_to_field(&self.to_gray())
    }
}

/// Convert a grayscale image into a float field of the same geometry.
pub fn luma_to_field(img: &GrayImage) -> Field<f32> {
    let shape = Shape::new(img.height() as usize, img.width() as usize);
    Field::from_fn(shape, |row, col| img.get_pixel(col as u32, row as u32)[0] as f32)
}

impl From<GrayImage> for Frame {
    fn from(img: GrayImage) -> Self {
        Frame::Gray(img)
    }
}

impl From<RgbImage> for Frame {
    fn from(img: RgbImage) -> Self {
        Frame::Rgb(img)
    }
}

impl From<DynamicImage> for Frame {
    fn from(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => Frame::Gray(gray),
            DynamicImage::ImageRgb8(rgb) => Frame::Rgb(rgb),
            other if other.color().has_color() => Frame::Rgb(other.to_rgb8()),
            other => Frame::Gray(other.to_luma8()),
        }
    }
}
