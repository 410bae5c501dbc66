use js_sys::{Array, Object, Reflect};
use tracing::info;
use wasm_bindgen::prelude::*;

pub mod cluster;
pub mod convert;
pub mod error;
pub mod image_input;
pub mod naming;
pub mod options;
pub mod swatch;

pub use cluster::{
    ClusterSummary, Clustering, cluster, rank_clusters, select_k, silhouette_score, summarize,
    within_cluster_sum_of_squares,
};
pub use convert::{Color, distance, lab_to_rgb, rgb_to_lab};
pub use error::{PaletteError, Result};
pub use image_input::{ImageBuffer, load_image_bytes, load_image_path};
pub use naming::{ReferenceTable, name_color};
pub use options::{ExtractOptions, KRange};
pub use swatch::{NamedColor, Palette, assemble};

/// Extract the dominant colors of an already loaded image.
///
/// Steps performed:
/// 1. Flatten the image to LAB pixel vectors (row-major).
/// 2. Pick the number of colors with the silhouette search, unless
///    `opts.clusters` fixes it.
/// 3. Run k-means in LAB space and rank the clusters by pixel count.
/// 4. Name each cluster's mean color with `table`.
///
/// Nothing is returned unless every step succeeds.
pub fn extract_palette(
    image: &ImageBuffer,
    opts: &ExtractOptions,
    table: &ReferenceTable,
) -> Result<Palette> {
    opts.validate()?;
    if image.is_empty() {
        return Err(PaletteError::InvalidInput("image has no pixels".into()));
    }

    let lab_pixels = image.to_lab_pixels();
    let ranked = rank_clusters(&lab_pixels, opts)?;
    let palette = assemble(&ranked, table);
    info!(
        pixels = lab_pixels.len(),
        colors = palette.len(),
        "extracted dominant colors"
    );
    Ok(palette)
}

/// Decode `input`, resize it per `opts.resize_width` and extract its
/// dominant colors, named with `table` or the built-in table.
pub fn extract_palette_bytes(
    input: &[u8],
    opts: &ExtractOptions,
    table: Option<&ReferenceTable>,
) -> Result<Palette> {
    opts.validate()?;
    let table = match table {
        Some(table) => table,
        None => ReferenceTable::builtin()?,
    };
    let image = load_image_bytes(input, opts.resize_width)?;
    extract_palette(&image, opts, table)
}

/// Extract the dominant colors of an encoded image.
///
/// `n_colors` fixes the palette size; when omitted it is chosen
/// automatically. `width` overrides the working width (default 250).
///
/// The returned object has `names`, `hex` (`RRGGBB`) and `lab`
/// (`[L, a, b]`) arrays, most dominant color first.
#[wasm_bindgen]
pub fn extract_dominant_colors(
    input: Vec<u8>,
    n_colors: Option<usize>,
    width: Option<u32>,
) -> std::result::Result<Object, JsValue> {
    let mut opts = ExtractOptions::default().with_clusters(n_colors);
    if width.is_some() {
        opts = opts.with_resize_width(width);
    }
    let palette = extract_palette_bytes(&input, &opts, None)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let names_js = Array::new();
    let hex_js = Array::new();
    let lab_js = Array::new();
    for color in &palette {
        names_js.push(&JsValue::from_str(&color.name));
        hex_js.push(&JsValue::from_str(&color.hex()));
        let [l, a, b] = color.lab_components();
        lab_js.push(&Array::of3(
            &JsValue::from_f64(l as f64),
            &JsValue::from_f64(a as f64),
            &JsValue::from_f64(b as f64),
        ));
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("names"), &names_js)?;
    Reflect::set(&result, &JsValue::from_str("hex"), &hex_js)?;
    Reflect::set(&result, &JsValue::from_str("lab"), &lab_js)?;

    Ok(result)
}
