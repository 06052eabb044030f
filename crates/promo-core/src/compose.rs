//! Raster compositing: SVG rasterisation via resvg, layer stacking and JPEG
//! encoding via the `image` crate.

use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgba, RgbaImage, imageops};
use resvg::tiny_skia;
use tracing::debug;

use crate::error::RenderError;

/// A raster image placed at an absolute pixel offset.
#[derive(Debug, Clone)]
pub struct Layer {
    pub image: RgbaImage,
    pub x: i64,
    pub y: i64,
}

/// Everything needed to produce one output image.
///
/// Drawing order: `background`, `underlay` (panels, scrims), `layers`
/// (logos, posters, crests), then `overlay` (text, watermark).
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: RgbaImage,
    pub underlay: String,
    pub layers: Vec<Layer>,
    pub overlay: String,
}

/// Rasteriser and encoder. Cheap to clone; the font database is shared.
#[derive(Clone)]
pub struct Compositor {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Compositor({} font faces)", self.fontdb.len())
    }
}

impl Compositor {
    /// Build a compositor backed by the fonts installed on this system.
    pub fn with_system_fonts() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "font database loaded");
        Self::with_fonts(db)
    }

    /// No fonts at all: text elements are skipped. Used in tests.
    pub fn without_fonts() -> Self {
        Self::with_fonts(usvg::fontdb::Database::new())
    }

    pub fn with_fonts(db: usvg::fontdb::Database) -> Self {
        Self { fontdb: Arc::new(db) }
    }

    pub fn font_faces(&self) -> usize {
        self.fontdb.len()
    }

    /// Rasterise an SVG document, stretched to `width` x `height`.
    pub fn rasterize_svg(&self, svg: &str, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
        let mut opts = usvg::Options::default();
        opts.fontdb = Arc::clone(&self.fontdb);
        let tree = usvg::Tree::from_str(svg, &opts)?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| RenderError::raster(format!("cannot allocate {width}x{height} pixmap")))?;

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let mut img = RgbaImage::new(width, height);
        for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(img)
    }

    /// Stack the scene and encode it as JPEG.
    pub fn compose(&self, scene: Scene, jpeg_quality: u8) -> Result<Vec<u8>, RenderError> {
        let Scene { mut background, underlay, layers, overlay } = scene;
        let (width, height) = background.dimensions();

        let under = self.rasterize_svg(&underlay, width, height)?;
        imageops::overlay(&mut background, &under, 0, 0);

        for layer in &layers {
            imageops::overlay(&mut background, &layer.image, layer.x, layer.y);
        }

        let over = self.rasterize_svg(&overlay, width, height)?;
        imageops::overlay(&mut background, &over, 0, 0);

        encode_jpeg(background, jpeg_quality)
    }
}

/// Flatten to RGB and encode. Quality is clamped to 1–100.
pub fn encode_jpeg(img: RgbaImage, quality: u8) -> Result<Vec<u8>, RenderError> {
    let rgb = DynamicImage::ImageRgba8(img).to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    DynamicImage::ImageRgb8(rgb).write_with_encoder(encoder)?;
    Ok(out)
}

/// A solid, fully opaque canvas.
pub fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width.max(1), height.max(1), color)
}

#[cfg(test)]
mod test {
    use super::*;

    fn empty_svg(w: u32, h: u32) -> String {
        format!(r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"></svg>"#)
    }

    #[test]
    fn rasterizes_to_requested_size() {
        let c = Compositor::without_fonts();
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 10 10"><rect width="10" height="10" fill="#ff0000"/></svg>"##;
        let img = c.rasterize_svg(svg, 40, 20).expect("rasterize");
        assert_eq!(img.dimensions(), (40, 20));
        assert_eq!(img.get_pixel(39, 19).0, [255, 0, 0, 255]);
    }

    #[test]
    fn invalid_svg_is_an_error() {
        let c = Compositor::without_fonts();
        let err = c.rasterize_svg("<svg><unclosed", 10, 10).unwrap_err();
        assert!(matches!(err, RenderError::Svg(_)));
    }

    #[test]
    fn layers_land_at_their_offsets() {
        let c = Compositor::without_fonts();
        let scene = Scene {
            background: solid(64, 64, Rgba([0, 0, 0, 255])),
            underlay: empty_svg(64, 64),
            layers: vec![Layer { image: solid(16, 16, Rgba([255, 255, 255, 255])), x: 32, y: 32 }],
            overlay: empty_svg(64, 64),
        };
        let jpeg = c.compose(scene, 95).expect("compose");
        let decoded = image::load_from_memory(&jpeg).expect("decode").to_rgb8();
        assert_eq!(decoded.dimensions(), (64, 64));
        assert!(decoded.get_pixel(40, 40).0[0] > 200);
        assert!(decoded.get_pixel(8, 8).0[0] < 40);
    }

    #[test]
    fn jpeg_output_has_magic_bytes() {
        let bytes = encode_jpeg(solid(8, 8, Rgba([10, 20, 30, 255])), 0).expect("encode");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
