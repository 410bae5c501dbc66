//! End-to-end extraction on synthetic images.

use dominant_colors::{
    ExtractOptions, ImageBuffer, PaletteError, ReferenceTable, extract_palette,
    extract_palette_bytes,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 128, 0];
const BLUE: [u8; 3] = [0, 0, 255];

/// Row-major image filled with `runs` of (color, pixel count).
fn image_from_runs(width: u32, height: u32, runs: &[([u8; 3], usize)]) -> ImageBuffer {
    let data: Vec<u8> = runs
        .iter()
        .flat_map(|&(color, n)| std::iter::repeat_n(color, n))
        .flatten()
        .collect();
    ImageBuffer::from_rgb8(width, height, &data).unwrap()
}

fn red_blue_table() -> ReferenceTable {
    ReferenceTable::from_json(r#"{"red": [53, 80, 67], "blue": [32, 79, -108]}"#).unwrap()
}

#[test]
fn seventy_red_thirty_blue_with_two_colors() {
    let image = image_from_runs(10, 10, &[(RED, 70), (BLUE, 30)]);
    let opts = ExtractOptions::default().with_clusters(Some(2));

    let palette = extract_palette(&image, &opts, &red_blue_table()).unwrap();
    assert_eq!(palette.names().collect::<Vec<_>>(), vec!["red", "blue"]);

    let builtin = ReferenceTable::builtin().unwrap();
    let palette = extract_palette(&image, &opts, builtin).unwrap();
    assert_eq!(palette.len(), 2);
    assert_eq!(palette.colors()[0].name, "red");
    assert_eq!(palette.colors()[1].name, "blue");
    assert_eq!(palette.colors()[0].hex(), "FF0000");
    assert_eq!(palette.colors()[1].hex(), "0000FF");
}

#[test]
fn interleaved_pixels_rank_the_same() {
    // Same 70/30 split, blue pixels scattered first in scan order.
    let data: Vec<u8> = (0..100)
        .flat_map(|i| if i % 10 < 3 { BLUE } else { RED })
        .collect();
    let image = ImageBuffer::from_rgb8(10, 10, &data).unwrap();
    let opts = ExtractOptions::default().with_clusters(Some(2));
    let palette = extract_palette(&image, &opts, &red_blue_table()).unwrap();
    assert_eq!(palette.names().collect::<Vec<_>>(), vec!["red", "blue"]);
}

#[test]
fn three_colors_rank_by_area() {
    let image = image_from_runs(10, 10, &[(BLUE, 10), (GREEN, 30), (RED, 60)]);
    let opts = ExtractOptions::default().with_clusters(Some(3));
    let palette = extract_palette(&image, &opts, ReferenceTable::builtin().unwrap()).unwrap();
    assert_eq!(
        palette.names().collect::<Vec<_>>(),
        vec!["red", "green", "blue"]
    );
}

#[test]
fn color_count_is_selected_when_not_given() {
    let image = image_from_runs(12, 10, &[(RED, 40), (GREEN, 40), (BLUE, 40)]);
    let palette =
        extract_palette(&image, &ExtractOptions::default(), ReferenceTable::builtin().unwrap())
            .unwrap();
    assert_eq!(palette.len(), 3);
}

#[test]
fn encoded_images_go_through_the_loader() {
    let mut img = RgbImage::from_pixel(8, 8, Rgb(RED));
    for y in 6..8 {
        for x in 0..8 {
            img.put_pixel(x, y, Rgb(BLUE));
        }
    }
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();

    let opts = ExtractOptions::default()
        .with_clusters(Some(2))
        .with_resize_width(None);
    let palette = extract_palette_bytes(&png, &opts, None).unwrap();
    assert_eq!(palette.names().collect::<Vec<_>>(), vec!["red", "blue"]);
}

#[test]
fn invalid_inputs_fail_before_clustering() {
    assert!(matches!(
        ImageBuffer::from_rgb8(0, 0, &[]),
        Err(PaletteError::InvalidInput(_))
    ));
    assert!(matches!(
        extract_palette_bytes(b"\x89PNG broken", &ExtractOptions::default(), None),
        Err(PaletteError::Decode(_))
    ));

    let image = image_from_runs(2, 1, &[(RED, 2)]);
    let opts = ExtractOptions::default().with_clusters(Some(0));
    assert!(matches!(
        extract_palette(&image, &opts, &red_blue_table()),
        Err(PaletteError::InvalidInput(_))
    ));
}

#[test]
fn single_color_image_cannot_choose_a_count() {
    let image = image_from_runs(5, 5, &[(GREEN, 25)]);
    assert!(matches!(
        extract_palette(&image, &ExtractOptions::default(), &red_blue_table()),
        Err(PaletteError::InvalidInput(_))
    ));
}
