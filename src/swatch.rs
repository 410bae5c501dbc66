//! Named colors and the ranked palette handed to presentation.

use palette::{Lab, Srgb};

use crate::cluster::ClusterSummary;
use crate::convert::{Color, lab_components};
use crate::naming::ReferenceTable;

/// One color in three forms: sRGB, LAB and its reference name.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedColor {
    pub name: String,
    pub rgb: Srgb<f32>,
    pub lab: Lab,
}

impl NamedColor {
    /// Derive both representations from `color` and name it with `table`.
    pub fn new(color: impl Into<Color>, table: &ReferenceTable) -> Self {
        let color = color.into();
        let lab = color.to_lab();
        Self {
            name: table.name_color(&lab).to_string(),
            rgb: color.to_rgb(),
            lab,
        }
    }

    pub fn rgb8(&self) -> [u8; 3] {
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_u8(self.rgb.red), to_u8(self.rgb.green), to_u8(self.rgb.blue)]
    }

    /// Uppercase `RRGGBB`, no leading `#`.
    pub fn hex(&self) -> String {
        let [r, g, b] = self.rgb8();
        format!("{r:02X}{g:02X}{b:02X}")
    }

    pub fn lab_components(&self) -> [f32; 3] {
        lab_components(&self.lab)
    }
}

/// Named colors, most dominant first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Palette {
    colors: Vec<NamedColor>,
}

impl Palette {
    pub fn colors(&self) -> &[NamedColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.colors.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedColor> {
        self.colors.iter()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a NamedColor;
    type IntoIter = std::slice::Iter<'a, NamedColor>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}

/// Turn ranked cluster summaries into a palette, keeping their order.
pub fn assemble(ranked: &[ClusterSummary], table: &ReferenceTable) -> Palette {
    Palette {
        colors: ranked
            .iter()
            .map(|summary| NamedColor::new(summary.mean, table))
            .collect(),
    }
}
