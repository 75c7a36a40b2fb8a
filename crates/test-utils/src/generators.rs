//! Synthetic image generators for tiles and mosaic frames.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageOutputFormat, Rgba, RgbaImage};

/// Creates a square tile filled with a single colour.
pub fn solid_tile(size: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(size, size, Rgba(color))
}

/// Encodes an image as PNG bytes, as a tile server would return it.
pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .expect("Failed to encode test PNG");
    buffer.into_inner()
}

/// PNG bytes of a solid-colour square tile.
pub fn solid_tile_png(size: u32, color: [u8; 4]) -> Vec<u8> {
    png_bytes(&solid_tile(size, color))
}

/// Writes a solid-colour `frame_<HHMM>.png` into `dir`.
pub fn write_test_frame(dir: &Path, hhmm: &str, size: u32, color: [u8; 4]) -> PathBuf {
    let path = dir.join(format!("frame_{}.png", hhmm));
    solid_tile(size, color)
        .save(&path)
        .expect("Failed to write test frame");
    path
}
