//! The community cover: recent gallery logos tiled onto one sheet.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::Pixmap;
use tracing::debug;

use super::GalleryEntry;
use crate::compose::{LogoSize, compose};
use crate::error::ExportError;
use crate::raster::encode::{encode_image, pixmap_to_rgba_image};
use crate::raster::{DecodedLogo, ExportArtifact, ExportConfig, Placement};

/// Grid geometry of the cover, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverLayout {
    pub columns: u32,
    pub tile_width: u32,
    pub gap: u32,
    pub margin: u32,
}

impl Default for CoverLayout {
    fn default() -> Self {
        Self {
            columns: 5,
            tile_width: 240,
            gap: 16,
            margin: 32,
        }
    }
}

impl CoverLayout {
    fn tile_height(&self) -> u32 {
        LogoSize::from_width(self.tile_width as f32).height.ceil() as u32
    }

    fn rows(&self, tiles: usize) -> u32 {
        let columns = self.columns.max(1) as usize;
        tiles.div_ceil(columns).max(1) as u32
    }

    /// Sheet dimensions for `tiles` logos.
    pub fn sheet_size(&self, tiles: usize) -> (u32, u32) {
        let columns = self.columns.max(1);
        let rows = self.rows(tiles);
        let width = 2 * self.margin + columns * self.tile_width + (columns - 1) * self.gap;
        let height = 2 * self.margin + rows * self.tile_height() + (rows - 1) * self.gap;
        (width, height)
    }

    /// Top-left corner of tile `index`.
    pub fn tile_origin(&self, index: usize) -> (i32, i32) {
        let columns = self.columns.max(1) as usize;
        let (col, row) = ((index % columns) as u32, (index / columns) as u32);
        (
            (self.margin + col * (self.tile_width + self.gap)) as i32,
            (self.margin + row * (self.tile_height() + self.gap)) as i32,
        )
    }
}

/// Renders `entries` left to right, top to bottom, on a white sheet and
/// encodes it with `encoding`'s format and quality.
pub fn render_cover(
    entries: &[GalleryEntry],
    layout: &CoverLayout,
    encoding: &ExportConfig,
) -> Result<ExportArtifact, ExportError> {
    let (width, height) = layout.sheet_size(entries.len());
    let mut sheet = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    for (index, entry) in entries.iter().enumerate() {
        let tile = render_tile(entry, layout.tile_width)?;
        let (x, y) = layout.tile_origin(index);
        composite_over(&mut sheet, &tile, x, y);
    }
    debug!(tiles = entries.len(), width, height, "rendered community cover");

    let bytes = encode_image(&sheet, encoding.format, encoding.quality)?;
    Ok(ExportArtifact {
        bytes,
        format: encoding.format,
        width,
        height,
    })
}

/// Renders one logo scaled to `width`, on a transparent background.
fn render_tile(entry: &GalleryEntry, width: u32) -> Result<RgbaImage, ExportError> {
    let size = LogoSize::from_width(width as f32);
    let document = compose(&entry.colors, size);
    let logo = DecodedLogo::from_data(document.markup().as_bytes())?;

    let (w, h) = (width, size.height.ceil() as u32);
    let mut pixmap = Pixmap::new(w, h).ok_or(ExportError::Surface(w, h))?;
    logo.draw(&mut pixmap, Placement::centered(w, h, size));
    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Source-over composite of `src` onto `dest` with its top-left at `(x, y)`.
/// Pixels falling outside `dest` are dropped.
fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let (dest_w, dest_h) = (dest.width() as i32, dest.height() as i32);
    for (sx, sy, src_px) in src.enumerate_pixels() {
        let (dx, dy) = (x + sx as i32, y + sy as i32);
        if dx < 0 || dy < 0 || dx >= dest_w || dy >= dest_h {
            continue;
        }
        let dst_px = dest.get_pixel_mut(dx as u32, dy as u32);
        *dst_px = blend(*src_px, *dst_px);
    }
}

fn blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{Color, Region, RegionColorMap};
    use crate::session::OwnerHandle;
    use chrono::Utc;

    fn entry(background: &str) -> GalleryEntry {
        let mut colors = RegionColorMap::default();
        colors.set(Region::Background, Color::new(background));
        GalleryEntry {
            owner_handle: OwnerHandle::parse("someone").ok(),
            colors,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sheet_grows_by_rows() {
        let layout = CoverLayout::default();
        let (w1, h1) = layout.sheet_size(1);
        let (w5, h5) = layout.sheet_size(5);
        let (w6, h6) = layout.sheet_size(6);
        assert_eq!(w1, 32 * 2 + 5 * 240 + 4 * 16);
        assert_eq!((w1, h1), (w5, h5));
        assert_eq!(w6, w5);
        assert_eq!(h6, h5 + layout.tile_height() + 16);
        assert_eq!(layout.sheet_size(0), (w1, h1));
    }

    #[test]
    fn tiles_wrap_to_next_row() {
        let layout = CoverLayout::default();
        assert_eq!(layout.tile_origin(0), (32, 32));
        assert_eq!(layout.tile_origin(1), (32 + 256, 32));
        assert_eq!(layout.tile_origin(5), (32, 32 + layout.tile_height() as i32 + 16));
    }

    #[test]
    fn cover_shows_each_logo_on_white() {
        let layout = CoverLayout::default();
        let entries = vec![entry("#FF0000"), entry("#00FF00")];
        let artifact = render_cover(&entries, &layout, &ExportConfig::default()).unwrap();

        let img = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (artifact.width, artifact.height));
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);

        // Background square interior, viewBox (40, 124).
        let scale = layout.tile_width as f32 / crate::compose::VIEWBOX_WIDTH;
        let probe = |index: usize| {
            let (x, y) = layout.tile_origin(index);
            *img.get_pixel(x as u32 + (40.0 * scale) as u32, y as u32 + (124.0 * scale) as u32)
        };
        assert_eq!(probe(0).0, [255, 0, 0, 255]);
        assert_eq!(probe(1).0, [0, 255, 0, 255]);
    }

    #[test]
    fn composite_clips_and_blends() {
        let mut dest = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let src = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 255, 255]));
        composite_over(&mut dest, &src, 2, -1);
        assert_eq!(dest.get_pixel(3, 0).0, [0, 0, 255, 255]);
        assert_eq!(dest.get_pixel(1, 0).0, [255, 0, 0, 255]);
        assert_eq!(dest.get_pixel(2, 2).0, [255, 0, 0, 255]);

        let half = blend(Rgba([0, 0, 255, 128]), Rgba([255, 0, 0, 255]));
        assert!(half[0] > 0 && half[2] > 0);
        assert_eq!(half[3], 255);
    }
}
