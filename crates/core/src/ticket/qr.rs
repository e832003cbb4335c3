//! QR rasterization.
//!
//! PDF pages cannot carry SVG markup, so the QR payload is rendered to a
//! fixed square bitmap on an opaque white background and embedded as an
//! image. Edges are rendered crisp and the bitmap is embedded losslessly.

use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg;

use super::DocumentError;

/// Edge length of the QR bitmap in pixels.
pub const QR_RASTER_SIZE: u32 = 600;

/// Channel value below which a pixel counts as a dark module.
const DARK_THRESHOLD: u8 = 128;

/// Opaque 8-bit RGB bitmap, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRaster {
    pub size: u32,
    pub rgb: Vec<u8>,
}

impl QrRaster {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * self.size + x) * 3) as usize;
        [self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]]
    }

    fn has_dark_pixels(&self) -> bool {
        self.rgb
            .chunks_exact(3)
            .any(|px| px.iter().all(|&c| c < DARK_THRESHOLD))
    }
}

/// Render `svg` to a `size`×`size` bitmap, stretched to fill the square.
pub fn rasterize_qr(svg: &str, size: u32) -> Result<QrRaster, DocumentError> {
    let options = usvg::Options {
        shape_rendering: usvg::ShapeRendering::CrispEdges,
        ..usvg::Options::default()
    };

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| DocumentError::Rasterize(format!("invalid QR markup: {}", e)))?;

    let mut pixmap = Pixmap::new(size, size)
        .ok_or_else(|| DocumentError::Rasterize(format!("cannot allocate {}px raster", size)))?;
    pixmap.fill(Color::WHITE);

    let tree_size = tree.size();
    let transform = Transform::from_scale(
        size as f32 / tree_size.width(),
        size as f32 / tree_size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // Opaque background, so premultiplied and straight RGB are the same
    let rgb = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let raster = QrRaster { size, rgb };
    if !raster.has_dark_pixels() {
        return Err(DocumentError::Rasterize(
            "QR markup rendered to a blank image".to_string(),
        ));
    }

    Ok(raster)
}
