//! Decoding, resizing and flattening of input images.

use std::path::Path;

use image::{DynamicImage, GenericImageView, imageops::FilterType};
use palette::{Lab, Srgb};
use tracing::debug;

use crate::convert::rgb_to_lab;
use crate::error::{PaletteError, Result};

/// Immutable grid of sRGB pixels in `[0, 1]`, stored row-major.
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Srgb<f32>>,
}

impl ImageBuffer {
    /// Build from interleaved 8-bit RGB channels.
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        check_dimensions(width, height, data.len())?;
        let pixels = data
            .chunks_exact(3)
            .map(|c| Srgb::new(c[0], c[1], c[2]).into_format())
            .collect();
        Ok(Self { width, height, pixels })
    }

    /// Build from interleaved RGB channels already normalized to `[0, 1]`.
    pub fn from_rgb_f32(width: u32, height: u32, data: &[f32]) -> Result<Self> {
        check_dimensions(width, height, data.len())?;
        if let Some(bad) = data.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(PaletteError::invalid_input(format!(
                "channel value {bad} outside [0, 1]"
            )));
        }
        let pixels = data
            .chunks_exact(3)
            .map(|c| Srgb::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self { width, height, pixels })
    }

    /// Take the RGB channels of a decoded image; alpha is dropped.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::from_rgb8(width, height, img.to_rgb8().as_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Srgb<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn pixels(&self) -> &[Srgb<f32>] {
        &self.pixels
    }

    /// Flatten to LAB vectors in row-major order.
    pub fn to_lab_pixels(&self) -> Vec<Lab> {
        self.pixels.iter().map(|&p| rgb_to_lab(p)).collect()
    }
}

/// Decode an encoded image and optionally resize it to `width`.
pub fn load_image_bytes(input: &[u8], width: Option<u32>) -> Result<ImageBuffer> {
    let img = image::load_from_memory(input)?;
    prepare(img, width)
}

pub fn load_image_path(path: impl AsRef<Path>, width: Option<u32>) -> Result<ImageBuffer> {
    let bytes = std::fs::read(path.as_ref())?;
    load_image_bytes(&bytes, width)
}

/// Resize so the width equals `width`, keeping the aspect ratio.
pub fn resize_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
    let (orig_w, orig_h) = img.dimensions();
    if orig_w == width || orig_w == 0 {
        return img.clone();
    }
    let ratio = orig_h as f32 / orig_w as f32;
    let height = ((width as f32) * ratio).max(1.0) as u32;
    img.resize_exact(width, height, FilterType::Triangle)
}

fn prepare(img: DynamicImage, width: Option<u32>) -> Result<ImageBuffer> {
    let (orig_w, orig_h) = img.dimensions();
    let working = match width {
        Some(0) => return Err(PaletteError::invalid_input("resize width must be at least 1")),
        Some(w) => resize_to_width(&img, w),
        None => img,
    };
    let buffer = ImageBuffer::from_dynamic(&working)?;
    debug!(
        orig_w,
        orig_h,
        width = buffer.width(),
        height = buffer.height(),
        "image ready for clustering"
    );
    Ok(buffer)
}

fn check_dimensions(width: u32, height: u32, channels: usize) -> Result<()> {
    let pixels = width as usize * height as usize;
    if pixels == 0 {
        return Err(PaletteError::invalid_input(format!(
            "image has no pixels ({width}x{height})"
        )));
    }
    if channels != pixels * 3 {
        return Err(PaletteError::invalid_input(format!(
            "expected {} RGB channel values for {width}x{height}, got {channels}",
            pixels * 3
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn encode_png(img: RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn rgb8_is_normalized() {
        let buffer = ImageBuffer::from_rgb8(2, 1, &[255, 0, 0, 0, 51, 255]).unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.pixel(0, 0), Some(Srgb::new(1.0, 0.0, 0.0)));
        let p = buffer.pixel(1, 0).unwrap();
        assert!((p.green - 0.2).abs() < 1e-6);
        assert_eq!(buffer.pixel(2, 0), None);
    }

    #[test]
    fn rejects_empty_and_misshapen_buffers() {
        assert!(matches!(
            ImageBuffer::from_rgb8(0, 5, &[]),
            Err(PaletteError::InvalidInput(_))
        ));
        assert!(matches!(
            ImageBuffer::from_rgb8(2, 2, &[0; 16]),
            Err(PaletteError::InvalidInput(_))
        ));
        assert!(matches!(
            ImageBuffer::from_rgb_f32(1, 1, &[0.5, 1.5, 0.0]),
            Err(PaletteError::InvalidInput(_))
        ));
    }

    #[test]
    fn flattening_is_row_major() {
        let data = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let buffer = ImageBuffer::from_rgb8(2, 2, &data).unwrap();
        let labs = buffer.to_lab_pixels();
        assert_eq!(labs.len(), 4);
        assert_eq!(labs[1], rgb_to_lab(Srgb::new(0.0, 1.0, 0.0)));
        assert_eq!(labs[2], rgb_to_lab(Srgb::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn decoded_images_resize_to_width() {
        let png = encode_png(RgbImage::from_pixel(40, 20, Rgb([10, 200, 30])));
        let buffer = load_image_bytes(&png, Some(10)).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (10, 5));

        let native = load_image_bytes(&png, None).unwrap();
        assert_eq!((native.width(), native.height()), (40, 20));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            load_image_bytes(b"not an image", None),
            Err(PaletteError::Decode(_))
        ));
    }
}
