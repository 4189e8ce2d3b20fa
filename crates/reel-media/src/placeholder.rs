//! Gradient placeholder images for scenes without a fetched image.

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use std::io::Cursor;

use reel_models::encoding::{OUTPUT_HEIGHT, OUTPUT_WIDTH};

use crate::error::MediaResult;

type Color = (u8, u8, u8);

/// Top and bottom gradient colours, indexed by scene order modulo length.
pub const PALETTE: [(Color, Color); 5] = [
    ((48, 25, 52), (89, 57, 161)),
    ((26, 35, 126), (21, 101, 192)),
    ((27, 94, 32), (56, 142, 60)),
    ((183, 28, 28), (229, 57, 53)),
    ((230, 81, 0), (255, 143, 0)),
];

/// Gradient colours for a scene.
pub fn placeholder_colors(scene_order: u32) -> (Color, Color) {
    PALETTE[scene_order as usize % PALETTE.len()]
}

fn lerp(from: u8, to: u8, ratio: f64) -> u8 {
    (from as f64 + (to as f64 - from as f64) * ratio) as u8
}

/// Render a full-resolution vertical gradient as PNG bytes.
pub fn render_placeholder_png(scene_order: u32) -> MediaResult<Vec<u8>> {
    let (top, bottom) = placeholder_colors(scene_order);

    let img = ImageBuffer::from_fn(OUTPUT_WIDTH, OUTPUT_HEIGHT, |_, y| {
        let ratio = y as f64 / OUTPUT_HEIGHT as f64;
        Rgb([
            lerp(top.0, bottom.0, ratio),
            lerp(top.1, bottom.1, ratio),
            lerp(top.2, bottom.2, ratio),
        ])
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}
