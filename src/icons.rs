//! App icon generation for the installable web manifest.
//!
//! Every icon is drawn on a 512px design grid and scaled to the target size:
//! a gradient disc on white with a video-camera glyph in front. Icons of
//! 192px and above get four small sparkles near the corners.

use std::path::{Path, PathBuf};

use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, Path as SkPath, PathBuilder, Pixmap,
    Point, Rect, SpreadMode, Transform,
};

use crate::error::IconError;

pub const ICON_SIZES: [u32; 8] = [72, 96, 128, 144, 152, 192, 384, 512];

const DESIGN_GRID: f32 = 512.0;
const GRADIENT_TOP: [u8; 3] = [102, 126, 234];
const GRADIENT_BOTTOM: [u8; 3] = [103, 110, 234];
const SPARKLE_MIN_SIZE: u32 = 192;

pub fn icon_file_name(size: u32) -> String {
    format!("icon-{}x{}.png", size, size)
}

/// Renders one square icon.
pub fn render_icon(size: u32) -> Result<Pixmap, IconError> {
    let mut pixmap = Pixmap::new(size, size).ok_or(IconError::InvalidSize(size))?;
    pixmap.fill(Color::WHITE);

    let side = size as f32;
    draw_gradient_disc(&mut pixmap, side)?;
    draw_camera(&mut pixmap, side / DESIGN_GRID);
    if size >= SPARKLE_MIN_SIZE {
        draw_sparkles(&mut pixmap, side);
    }

    Ok(pixmap)
}

/// Writes every icon size into `dir` and returns the written paths.
pub fn write_icon_set(dir: &Path) -> Result<Vec<PathBuf>, IconError> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(ICON_SIZES.len());
    for size in ICON_SIZES {
        let png = render_icon(size)?
            .encode_png()
            .map_err(|e| IconError::Encode(e.to_string()))?;
        let path = dir.join(icon_file_name(size));
        std::fs::write(&path, png)?;
        tracing::info!("Generated {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn solid(r: u8, g: u8, b: u8, a: u8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn fill(pixmap: &mut Pixmap, path: Option<SkPath>, paint: &Paint) {
    if let Some(path) = path {
        pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
    }
}

fn draw_gradient_disc(pixmap: &mut Pixmap, side: f32) -> Result<(), IconError> {
    let [tr, tg, tb] = GRADIENT_TOP;
    let [br, bg, bb] = GRADIENT_BOTTOM;
    let shader = LinearGradient::new(
        Point::from_xy(0.0, 0.0),
        Point::from_xy(0.0, side),
        vec![
            GradientStop::new(0.0, Color::from_rgba8(tr, tg, tb, 255)),
            GradientStop::new(1.0, Color::from_rgba8(br, bg, bb, 255)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    )
    .ok_or_else(|| IconError::Encode("invalid gradient".to_string()))?;

    let paint = Paint {
        shader,
        anti_alias: true,
        ..Default::default()
    };
    let half = side / 2.0;
    fill(pixmap, PathBuilder::from_circle(half, half, half), &paint);
    Ok(())
}

fn rounded_rect(left: f32, top: f32, right: f32, bottom: f32, radius: f32) -> Option<SkPath> {
    let radius = radius.min((right - left) / 2.0).min((bottom - top) / 2.0).max(0.0);
    if radius == 0.0 {
        return Rect::from_ltrb(left, top, right, bottom).map(PathBuilder::from_rect);
    }

    let mut pb = PathBuilder::new();
    pb.move_to(left + radius, top);
    pb.line_to(right - radius, top);
    pb.quad_to(right, top, right, top + radius);
    pb.line_to(right, bottom - radius);
    pb.quad_to(right, bottom, right - radius, bottom);
    pb.line_to(left + radius, bottom);
    pb.quad_to(left, bottom, left, bottom - radius);
    pb.line_to(left, top + radius);
    pb.quad_to(left, top, left + radius, top);
    pb.close();
    pb.finish()
}

fn draw_camera(pixmap: &mut Pixmap, scale: f32) {
    let s = |v: f32| (v * scale).floor();

    // body
    fill(
        pixmap,
        rounded_rect(s(120.0), s(180.0), s(320.0), s(332.0), s(20.0)),
        &solid(255, 255, 255, 255),
    );

    // lens, outer then inner ring
    let (lens_x, lens_y) = (s(200.0), s(240.0));
    fill(
        pixmap,
        PathBuilder::from_circle(lens_x, lens_y, s(40.0)),
        &solid(200, 200, 255, 255),
    );
    fill(
        pixmap,
        PathBuilder::from_circle(lens_x, lens_y, s(25.0)),
        &solid(150, 150, 220, 255),
    );

    // record light
    fill(
        pixmap,
        PathBuilder::from_circle(s(280.0), s(200.0), s(12.0)),
        &solid(255, 80, 80, 255),
    );

    // viewfinder
    let mut pb = PathBuilder::new();
    pb.move_to(s(340.0), s(220.0));
    pb.line_to(s(400.0), s(256.0));
    pb.line_to(s(340.0), s(292.0));
    pb.close();
    fill(pixmap, pb.finish(), &solid(255, 255, 255, 255));

    // microphone grille
    let grille = solid(220, 220, 255, 255);
    for i in 0..3 {
        let x = s(160.0) + i as f32 * s(8.0);
        let y = s(195.0);
        let path = Rect::from_ltrb(x, y, x + s(3.0).max(1.0), y + s(15.0).max(1.0))
            .map(PathBuilder::from_rect);
        fill(pixmap, path, &grille);
    }
}

fn draw_sparkles(pixmap: &mut Pixmap, side: f32) {
    let radius = (side * 0.03).floor();
    let paint = solid(255, 255, 255, 200);
    for (fx, fy) in [(0.15, 0.15), (0.85, 0.2), (0.2, 0.8), (0.8, 0.85)] {
        let (x, y) = ((side * fx).floor(), (side * fy).floor());
        fill(pixmap, PathBuilder::from_circle(x, y, radius), &paint);
    }
}
