// Writes feature grids out as grayscale images for inspection or as
// classifier training samples.

use std::path::Path;

use image::{GrayImage, Luma};
use log::info;

use crate::error::{Error, Result};
use crate::grid::PixelGrid;

const INK: Luma<u8> = Luma([0]);
const PAPER: Luma<u8> = Luma([255]);

/// Renders `grid` with each cell as a `scale x scale` block, active cells black.
pub fn to_gray_image(grid: &PixelGrid, scale: u32) -> GrayImage {
    let scale = scale.max(1);
    let width = grid.width() as u32 * scale;
    let height = grid.height() as u32 * scale;
    let mut img = GrayImage::from_pixel(width, height, PAPER);
    for c in grid.active_coordinates() {
        let (x0, y0) = (c.x as u32 * scale, c.y as u32 * scale);
        for y in y0..y0 + scale {
            for x in x0..x0 + scale {
                img.put_pixel(x, y, INK);
            }
        }
    }
    img
}

pub fn save_png(grid: &PixelGrid, path: &Path, scale: u32) -> Result<()> {
    if grid.width() == 0 || grid.height() == 0 {
        return Err(Error::Export(format!("refusing to write empty {}x{} grid", grid.width(), grid.height())));
    }
    to_gray_image(grid, scale)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| Error::Export(format!("failed to write {}: {e}", path.display())))?;
    info!(target: "export", "saved {}x{} grid to {}", grid.width(), grid.height(), path.display());
    Ok(())
}
