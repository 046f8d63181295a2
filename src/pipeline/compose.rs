use tiny_skia::{BlendMode, Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::error::PipelineError;
use crate::pipeline::effects::{self, Animation, ClipState};

/// One timed visual element of the composition.
pub struct Layer {
    pub pixmap: Pixmap,
    pub start: f64,
    pub duration: f64,
    pub animations: Vec<Animation>,
}

impl Layer {
    pub fn is_active(&self, t: f64) -> bool {
        t >= self.start && t < self.start + self.duration
    }

    pub fn state_at(&self, t: f64) -> ClipState {
        effects::evaluate(&self.animations, t - self.start, self.duration)
    }
}

/// Everything needed to draw any frame: a solid background plus layers
/// painted in order.
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
    pub layers: Vec<Layer>,
}

impl Scene {
    pub fn render_frame(&self, t: f64) -> Result<Pixmap, PipelineError> {
        let mut frame = Pixmap::new(self.width, self.height).ok_or_else(|| {
            PipelineError::Raster(format!(
                "Failed to create {}x{} frame",
                self.width, self.height
            ))
        })?;
        let [r, g, b] = self.background;
        frame.fill(Color::from_rgba8(r, g, b, 255));

        for layer in self.layers.iter().filter(|layer| layer.is_active(t)) {
            let state = layer.state_at(t);
            if !state.is_visible() {
                continue;
            }
            draw_layer(&mut frame, &layer.pixmap, &state);
        }

        Ok(frame)
    }
}

fn draw_layer(frame: &mut Pixmap, pixmap: &Pixmap, state: &ClipState) {
    let center_x = frame.width() as f32 / 2.0 + state.offset_x as f32;
    let center_y = frame.height() as f32 / 2.0 + state.offset_y as f32;
    let scale = state.scale as f32;

    // Positive rotation turns counter-clockwise on screen.
    let transform = Transform::from_translate(center_x, center_y)
        .pre_concat(Transform::from_rotate(-state.rotation_deg as f32))
        .pre_scale(scale, scale)
        .pre_translate(-(pixmap.width() as f32) / 2.0, -(pixmap.height() as f32) / 2.0);

    let paint = PixmapPaint {
        opacity: state.opacity.clamp(0.0, 1.0) as f32,
        blend_mode: BlendMode::SourceOver,
        quality: FilterQuality::Bilinear,
    };

    frame.draw_pixmap(0, 0, pixmap.as_ref(), &paint, transform, None);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height).expect("pixmap");
        pixmap.fill(Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255));
        pixmap
    }

    fn scene_with_red_square() -> Scene {
        Scene {
            width: 64,
            height: 36,
            background: [30, 60, 114],
            layers: vec![Layer {
                pixmap: solid(16, 16, [255, 0, 0]),
                start: 1.0,
                duration: 2.0,
                animations: vec![Animation::FadeIn(0.5), Animation::FadeOut(0.5)],
            }],
        }
    }

    fn rgb_at(frame: &Pixmap, x: u32, y: u32) -> (u8, u8, u8) {
        let px = frame.pixel(x, y).expect("pixel");
        (px.red(), px.green(), px.blue())
    }

    #[test]
    fn background_fills_frames_without_active_layers() {
        let scene = scene_with_red_square();
        let frame = scene.render_frame(0.5).expect("frame");
        assert_eq!(rgb_at(&frame, 32, 18), (30, 60, 114));
        assert_eq!(rgb_at(&frame, 0, 0), (30, 60, 114));
        let frame = scene.render_frame(3.0).expect("frame");
        assert_eq!(rgb_at(&frame, 32, 18), (30, 60, 114));
    }

    #[test]
    fn active_layer_is_centred_and_opaque_mid_clip() {
        let scene = scene_with_red_square();
        let frame = scene.render_frame(2.0).expect("frame");
        assert_eq!(rgb_at(&frame, 32, 18), (255, 0, 0));
        assert_eq!(rgb_at(&frame, 2, 2), (30, 60, 114));
    }

    #[test]
    fn fading_layer_blends_with_background() {
        let scene = scene_with_red_square();
        let (r, _, b) = rgb_at(&scene.render_frame(1.25).expect("frame"), 32, 18);
        assert!(r > 30 && r < 255, "red channel {r} should be mid-blend");
        assert!(b > 0 && b < 114, "blue channel {b} should be mid-blend");
    }

    #[test]
    fn frames_are_opaque() {
        let scene = scene_with_red_square();
        let frame = scene.render_frame(1.1).expect("frame");
        assert!(frame.pixels().iter().all(|px| px.alpha() == 255));
    }

    #[test]
    fn sliding_layer_enters_from_the_left_edge() {
        let scene = Scene {
            width: 64,
            height: 36,
            background: [30, 60, 114],
            layers: vec![Layer {
                pixmap: solid(16, 16, [255, 0, 0]),
                start: 0.0,
                duration: 4.0,
                animations: vec![Animation::Slide(effects::SlidePath::from_left(64.0, 16.0))],
            }],
        };

        // Halfway: left edge at x = -8, so only columns 0..8 are covered.
        let frame = scene.render_frame(2.0).expect("frame");
        assert_eq!(rgb_at(&frame, 3, 18), (255, 0, 0));
        assert_eq!(rgb_at(&frame, 12, 18), (30, 60, 114));
        assert_eq!(rgb_at(&frame, 32, 18), (30, 60, 114));
    }
}
