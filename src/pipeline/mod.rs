//! Local composition: turns a catalog template plus uploaded media into an MP4.
//!
//! Frames are drawn with tiny-skia from a [`compose::Scene`] and streamed to the
//! system `ffmpeg` binary, which handles H.264/AAC encoding and soundtrack
//! looping.

pub mod compose;
pub mod effects;
pub mod encode;
pub mod layout;
pub mod rasterize;

use std::path::PathBuf;

use rayon::prelude::*;

use crate::error::PipelineError;
use crate::types::template::{Template, TextOverlay};
use compose::{Layer, Scene};
use encode::{EncodeConfig, FfmpegEncoder};

/// Frames rendered in parallel before being handed to the encoder in order.
const FRAME_BATCH: u32 = 48;

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub ffmpeg_path: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 24,
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompositionJob {
    pub template: Template,
    pub images: Vec<PathBuf>,
    pub text_overlays: Vec<TextOverlay>,
    pub audio: Option<PathBuf>,
    pub background: [u8; 3],
    pub output_path: PathBuf,
    pub settings: RenderSettings,
}

/// Renders and encodes the job, returning the written file. Blocking; call
/// from a blocking thread.
pub fn compose(job: &CompositionJob) -> Result<PathBuf, PipelineError> {
    let duration = job.template.duration as f64;
    let scene = build_scene(job)?;

    let encode_cfg = encode_config(job, duration);

    tracing::info!(
        "Composing template {} ({}): {} layers, {} frames at {} fps",
        job.template.id,
        job.template.name,
        scene.layers.len(),
        encode_cfg.total_frames(),
        encode_cfg.fps
    );

    match encode_scene(&scene, &encode_cfg) {
        Ok(()) => {
            tracing::info!("Wrote {}", job.output_path.display());
            Ok(job.output_path.clone())
        }
        Err(err) => {
            let _ = std::fs::remove_file(&job.output_path);
            Err(err)
        }
    }
}

/// Soundtrack to mux, if the file is still on disk. A missing file is logged
/// and the video is rendered silent.
fn usable_audio(audio: Option<&PathBuf>) -> Option<PathBuf> {
    audio
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                tracing::warn!("Audio file {} is missing; rendering without sound", path.display());
            }
            exists
        })
        .cloned()
}

fn encode_config(job: &CompositionJob, duration: f64) -> EncodeConfig {
    EncodeConfig {
        width: job.settings.width,
        height: job.settings.height,
        fps: job.settings.fps,
        duration_secs: duration,
        out_path: job.output_path.clone(),
        audio: usable_audio(job.audio.as_ref()),
        ffmpeg_path: job.settings.ffmpeg_path.clone(),
    }
}

fn encode_scene(scene: &Scene, cfg: &EncodeConfig) -> Result<(), PipelineError> {
    let total_frames = cfg.total_frames();
    let fps = cfg.fps as f64;
    let mut encoder = FfmpegEncoder::spawn(cfg)?;

    let mut batch_start = 0;
    while batch_start < total_frames {
        let batch_end = (batch_start + FRAME_BATCH).min(total_frames);
        let frames = (batch_start..batch_end)
            .into_par_iter()
            .map(|idx| {
                scene
                    .render_frame(idx as f64 / fps)
                    .map(|pixmap| pixmap.take())
                    .map_err(|err| {
                        PipelineError::Raster(format!("frame {}: {}", idx, err))
                    })
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        for frame in &frames {
            encoder.write_frame(frame)?;
        }
        batch_start = batch_end;
    }

    encoder.finish()
}

/// Builds the layer stack: image slots first, text overlays on top. Images
/// and overlays that fail to render are logged and left out.
pub fn build_scene(job: &CompositionJob) -> Result<Scene, PipelineError> {
    let RenderSettings { width, height, .. } = job.settings;
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidJob(
            "frame size must be non-zero".to_string(),
        ));
    }
    let duration = job.template.duration as f64;
    if duration <= 0.0 {
        return Err(PipelineError::InvalidJob(format!(
            "template {} has no duration",
            job.template.id
        )));
    }

    let mut layers = Vec::new();

    for window in layout::image_slot_windows(job.images.len(), duration) {
        let path = &job.images[window.index];
        let pixmap = match rasterize::load_image_layer(path, width, height) {
            Ok(pixmap) => pixmap,
            Err(err) => {
                tracing::warn!("Skipping image {}: {}", path.display(), err);
                continue;
            }
        };
        let slide = effects::SlidePath::from_left(width as f64, pixmap.width() as f64);
        layers.push(Layer {
            animations: effects::image_animations(
                job.template.effects,
                job.template.transitions,
                window.index,
                slide,
            ),
            pixmap,
            start: window.start,
            duration: window.duration,
        });
    }

    for overlay in layout::clamp_overlays(job.text_overlays.clone(), duration) {
        match rasterize::render_text_layer(&overlay.text, width, height, rasterize::TEXT_FONT_SIZE) {
            Ok(pixmap) => layers.push(Layer {
                pixmap,
                start: overlay.start,
                duration: overlay.duration,
                animations: effects::text_animations(),
            }),
            Err(err) => tracing::warn!("Skipping text overlay '{}': {}", overlay.text, err),
        }
    }

    Ok(Scene {
        width,
        height,
        background: job.background,
        layers,
    })
}
