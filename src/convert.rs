//! sRGB <-> CIE LAB conversion and the Euclidean color distance.
//!
//! LAB uses the D65 white point, the same one the reference color table is
//! expressed in. RGB components are gamma-encoded sRGB in `[0, 1]`.

use palette::{FromColor, Lab, Srgb};

use crate::error::{PaletteError, Result};

/// A color vector whose color space is always known.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Color {
    Rgb(Srgb<f32>),
    Lab(Lab),
}

impl Color {
    /// Build a tagged RGB color from a 3-component slice.
    pub fn rgb_from_slice(v: &[f32]) -> Result<Self> {
        let [r, g, b] = as_vector(v)?;
        Ok(Color::Rgb(Srgb::new(r, g, b)))
    }

    /// Build a tagged LAB color from a 3-component slice.
    pub fn lab_from_slice(v: &[f32]) -> Result<Self> {
        let [l, a, b] = as_vector(v)?;
        Ok(Color::Lab(Lab::new(l, a, b)))
    }

    pub fn to_lab(self) -> Lab {
        match self {
            Color::Rgb(rgb) => rgb_to_lab(rgb),
            Color::Lab(lab) => lab,
        }
    }

    pub fn to_rgb(self) -> Srgb<f32> {
        match self {
            Color::Rgb(rgb) => rgb,
            Color::Lab(lab) => lab_to_rgb(lab),
        }
    }

    /// Raw components in the color's own space.
    pub fn components(&self) -> [f32; 3] {
        match self {
            Color::Rgb(rgb) => [rgb.red, rgb.green, rgb.blue],
            Color::Lab(lab) => lab_components(lab),
        }
    }
}

impl From<Srgb<f32>> for Color {
    fn from(rgb: Srgb<f32>) -> Self {
        Color::Rgb(rgb)
    }
}

impl From<Lab> for Color {
    fn from(lab: Lab) -> Self {
        Color::Lab(lab)
    }
}

/// Convert one sRGB color (components in `[0, 1]`) to LAB.
#[inline]
pub fn rgb_to_lab(rgb: Srgb<f32>) -> Lab {
    Lab::from_color(rgb)
}

/// Convert one LAB color to sRGB, clamped into the `[0, 1]` cube.
#[inline]
pub fn lab_to_rgb(lab: Lab) -> Srgb<f32> {
    Srgb::from_color(lab)
}

/// Convert a flat `[r, g, b, r, g, b, ...]` buffer to LAB, element by element.
pub fn rgb_buffer_to_lab(data: &[f32]) -> Result<Vec<Lab>> {
    check_shape(data)?;
    Ok(data
        .chunks_exact(3)
        .map(|c| rgb_to_lab(Srgb::new(c[0], c[1], c[2])))
        .collect())
}

/// Convert a flat `[l, a, b, l, a, b, ...]` buffer to sRGB, element by element.
pub fn lab_buffer_to_rgb(data: &[f32]) -> Result<Vec<Srgb<f32>>> {
    check_shape(data)?;
    Ok(data
        .chunks_exact(3)
        .map(|c| lab_to_rgb(Lab::new(c[0], c[1], c[2])))
        .collect())
}

/// Euclidean distance between two 3-vectors of the same color space.
#[inline]
pub fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    (d0 * d0 + d1 * d1 + d2 * d2).sqrt()
}

#[inline]
pub fn lab_distance(a: &Lab, b: &Lab) -> f32 {
    distance(lab_components(a), lab_components(b))
}

#[inline]
pub fn lab_components(lab: &Lab) -> [f32; 3] {
    [lab.l, lab.a, lab.b]
}

fn as_vector(v: &[f32]) -> Result<[f32; 3]> {
    <[f32; 3]>::try_from(v).map_err(|_| PaletteError::Shape { len: v.len() })
}

fn check_shape(data: &[f32]) -> Result<()> {
    if data.len() % 3 != 0 {
        return Err(PaletteError::Shape { len: data.len() });
    }
    Ok(())
}
