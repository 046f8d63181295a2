use std::cell::RefCell;
use std::path::Path;

use image::imageops::FilterType;
use tiny_skia::{ColorU8, IntSize, Pixmap};

use crate::error::PipelineError;
use crate::pipeline::layout;

pub const TEXT_FONT_SIZE: u32 = 50;
const TEXT_FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, sans-serif";

thread_local! {
    static FONT_DB: RefCell<usvg::fontdb::Database> = RefCell::new(load_font_db());
}

fn load_font_db() -> usvg::fontdb::Database {
    let mut fontdb = usvg::fontdb::Database::new();
    // Prefer explicitly known font files so text rendering is reliable in containers.
    for path in [
        "/app/assets/fonts/DejaVuSans-Bold.ttf",
        "./assets/fonts/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        "C:\\Windows\\Fonts\\arialbd.ttf",
    ] {
        let _ = fontdb.load_font_file(path);
    }
    fontdb.load_system_fonts();
    fontdb
}

/// Renders `text` centred on a transparent frame-sized layer.
pub fn render_text_layer(
    text: &str,
    width: u32,
    height: u32,
    font_size: u32,
) -> Result<Pixmap, PipelineError> {
    let svg = text_svg(text, width, height, font_size);
    FONT_DB.with(|fontdb| {
        let fontdb = fontdb.borrow();
        rasterize_svg(&svg, width, height, &fontdb)
    })
}

fn text_svg(text: &str, width: u32, height: u32, font_size: u32) -> String {
    let escaped = quick_xml::escape::escape(text);
    let x = width / 2;
    // Baseline sits a little below the middle so the cap height is centred.
    let y = height as f32 / 2.0 + font_size as f32 * 0.35;
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\
<text x=\"{x}\" y=\"{y:.1}\" font-family=\"{TEXT_FONT_FAMILY}\" font-weight=\"bold\" font-size=\"{font_size}\" fill=\"rgb(255,255,255)\" text-anchor=\"middle\">{escaped}</text>\
</svg>"
    )
}

fn rasterize_svg(
    svg: &str,
    width: u32,
    height: u32,
    fontdb: &usvg::fontdb::Database,
) -> Result<Pixmap, PipelineError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options, fontdb)
        .map_err(|e| PipelineError::Raster(format!("Failed to parse SVG: {}", e)))?;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| PipelineError::Raster("Failed to create pixmap".to_string()))?;

    let transform = tiny_skia::Transform::from_scale(
        width as f32 / tree.size().width(),
        height as f32 / tree.size().height(),
    );

    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Decodes an uploaded image and resizes it to its slot size inside the frame.
pub fn load_image_layer(
    path: &Path,
    frame_width: u32,
    frame_height: u32,
) -> Result<Pixmap, PipelineError> {
    let decoded = image::open(path).map_err(|e| {
        PipelineError::Raster(format!("Failed to decode {}: {}", path.display(), e))
    })?;

    let (width, height) = layout::fit_image(
        decoded.width(),
        decoded.height(),
        frame_width,
        frame_height,
    );
    if width == 0 || height == 0 {
        return Err(PipelineError::Raster(format!(
            "Image {} has no pixels",
            path.display()
        )));
    }

    let rgba = decoded
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8();
    pixmap_from_rgba(rgba.width(), rgba.height(), rgba.as_raw())
}

/// Builds a pixmap from straight-alpha RGBA8 pixels.
pub fn pixmap_from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Pixmap, PipelineError> {
    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| PipelineError::Raster(format!("Invalid size {}x{}", width, height)))?;
    if rgba.len() != (width as usize) * (height as usize) * 4 {
        return Err(PipelineError::Raster(
            "RGBA buffer does not match image size".to_string(),
        ));
    }

    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| PipelineError::Raster("Failed to create pixmap".to_string()))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_escaped_into_svg() {
        let svg = text_svg("Fish & <Chips>", 1280, 720, 50);
        assert!(svg.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(svg.contains("text-anchor=\"middle\""));
    }

    #[test]
    fn text_layer_covers_the_frame() {
        let pixmap = render_text_layer("Shop Now", 320, 180, 24).expect("text layer");
        assert_eq!((pixmap.width(), pixmap.height()), (320, 180));
        // Corners stay transparent.
        assert_eq!(pixmap.pixel(0, 0).map(|p| p.alpha()), Some(0));
    }

    #[test]
    fn rgba_buffers_are_premultiplied() {
        let pixmap = pixmap_from_rgba(1, 1, &[255, 0, 0, 128]).expect("pixmap");
        let px = pixmap.pixel(0, 0).expect("pixel");
        assert_eq!(px.alpha(), 128);
        assert_eq!(px.red(), 128);
        assert!(pixmap_from_rgba(2, 2, &[0; 4]).is_err());
    }

    #[test]
    fn unreadable_images_report_raster_errors() {
        let err = load_image_layer(Path::new("/nonexistent/photo.png"), 1280, 720)
            .expect_err("missing file");
        assert!(matches!(err, PipelineError::Raster(_)));
    }
}
