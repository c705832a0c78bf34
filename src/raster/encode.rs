//! Bitmap conversion and encoding.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageError, Rgba, RgbaImage};
use resvg::tiny_skia::Pixmap;

use super::ArtifactFormat;

/// Copies a tiny-skia surface into an `RgbaImage`, undoing premultiplied
/// alpha.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    img
}

/// Encodes `img` in `format`.
///
/// `quality` is in `0.0..=1.0`. JPEG uses it directly; PNG is lossless, so
/// a quality of 0.9 or more only selects the strongest compression.
pub fn encode_image(
    img: &RgbaImage,
    format: ArtifactFormat,
    quality: f32,
) -> Result<Vec<u8>, ImageError> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ArtifactFormat::Png => {
            let compression = if quality >= 0.9 {
                CompressionType::Best
            } else {
                CompressionType::Default
            };
            let encoder = PngEncoder::new_with_quality(&mut buf, compression, FilterType::Adaptive);
            img.write_with_encoder(encoder)?;
        }
        ArtifactFormat::Jpeg => {
            let quality = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            rgb.write_with_encoder(encoder)?;
        }
    }
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resvg::tiny_skia::Color;

    #[test]
    fn conversion_keeps_opaque_pixels() {
        let mut pixmap = Pixmap::new(4, 3).unwrap();
        pixmap.fill(Color::from_rgba8(10, 20, 30, 255));

        let img = pixmap_to_rgba_image(&pixmap);
        assert_eq!(img.dimensions(), (4, 3));
        assert!(img.pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }

    #[test]
    fn conversion_unpremultiplies() {
        let mut pixmap = Pixmap::new(1, 1).unwrap();
        pixmap.fill(Color::from_rgba8(200, 0, 0, 128));

        let px = pixmap_to_rgba_image(&pixmap).get_pixel(0, 0).0;
        assert_eq!(px[3], 128);
        assert!(px[0] >= 198 && px[0] <= 202, "red was {}", px[0]);
    }

    #[test]
    fn png_output_decodes_back() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let bytes = encode_image(&img, ArtifactFormat::Png, 0.95).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn jpeg_output_has_soi_marker() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([0, 128, 255, 255]));
        let bytes = encode_image(&img, ArtifactFormat::Jpeg, 0.95).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
