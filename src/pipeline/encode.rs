use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::error::PipelineError;

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_secs: f64,
    pub out_path: PathBuf,
    /// Soundtrack looped or trimmed to `duration_secs`.
    pub audio: Option<PathBuf>,
    pub ffmpeg_path: String,
}

impl EncodeConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::InvalidJob(
                "encode width/height must be non-zero".to_string(),
            ));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            // yuv420p output needs even dimensions.
            return Err(PipelineError::InvalidJob(
                "encode width/height must be even".to_string(),
            ));
        }
        if self.fps == 0 {
            return Err(PipelineError::InvalidJob(
                "encode fps must be non-zero".to_string(),
            ));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(PipelineError::InvalidJob(
                "encode duration must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn total_frames(&self) -> u32 {
        (self.duration_secs * self.fps as f64).round().max(1.0) as u32
    }

    /// Command-line arguments for a run reading raw RGBA frames from stdin.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(format!("{}x{}", self.width, self.height));
        args.extend(["-r".to_string(), self.fps.to_string()]);
        args.extend(["-i".to_string(), "pipe:0".to_string()]);

        if let Some(audio) = self.audio.as_ref() {
            args.extend(["-stream_loop".to_string(), "-1".to_string()]);
            args.extend(["-i".to_string(), audio.display().to_string()]);
            args.extend(["-map".to_string(), "0:v:0".to_string()]);
            args.extend(["-map".to_string(), "1:a:0".to_string()]);
            args.extend(["-c:a".to_string(), "aac".to_string()]);
            args.extend(["-b:a".to_string(), "192k".to_string()]);
        } else {
            args.push("-an".to_string());
        }

        args.extend(
            [
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.extend(["-r".to_string(), self.fps.to_string()]);
        args.extend(["-t".to_string(), format!("{:.3}", self.duration_secs)]);
        args.push(self.out_path.display().to_string());
        args
    }
}

pub fn is_ffmpeg_available(ffmpeg_path: &str) -> bool {
    Command::new(ffmpeg_path)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub struct FfmpegEncoder {
    frame_len: usize,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl FfmpegEncoder {
    pub fn spawn(cfg: &EncodeConfig) -> Result<Self, PipelineError> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        let mut child = Command::new(&cfg.ffmpeg_path)
            .args(cfg.ffmpeg_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PipelineError::Encode(format!(
                    "failed to spawn {} (is it installed and on PATH?): {e}",
                    cfg.ffmpeg_path
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PipelineError::Encode("failed to open ffmpeg stdin".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| PipelineError::Encode("failed to open ffmpeg stderr".to_string()))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        Ok(Self {
            frame_len: (cfg.width as usize) * (cfg.height as usize) * 4,
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
        })
    }

    /// Writes one opaque RGBA8 frame.
    pub fn write_frame(&mut self, rgba: &[u8]) -> Result<(), PipelineError> {
        if rgba.len() != self.frame_len {
            return Err(PipelineError::Encode(format!(
                "frame size mismatch: got {} bytes, expected {}",
                rgba.len(),
                self.frame_len
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| PipelineError::Encode("ffmpeg encoder already finished".to_string()))?;
        stdin.write_all(rgba).map_err(|e| {
            PipelineError::Encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    pub fn finish(mut self) -> Result<(), PipelineError> {
        drop(self.stdin.take());

        let status = self
            .child
            .wait()
            .map_err(|e| PipelineError::Encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = self
            .stderr_drain
            .take()
            .and_then(|handle| handle.join().ok())
            .and_then(Result::ok)
            .unwrap_or_default();

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(PipelineError::Encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        // Only reached with a live child when rendering bailed out early.
        if self.stdin.take().is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(audio: Option<&str>) -> EncodeConfig {
        EncodeConfig {
            width: 1280,
            height: 720,
            fps: 24,
            duration_secs: 10.0,
            out_path: PathBuf::from("uploads/video_test.mp4"),
            audio: audio.map(PathBuf::from),
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut cfg = config(None);
        assert!(cfg.validate().is_ok());
        cfg.width = 1281;
        assert!(cfg.validate().is_err());
        let mut cfg = config(None);
        cfg.fps = 0;
        assert!(cfg.validate().is_err());
        let mut cfg = config(None);
        cfg.duration_secs = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn frame_count_follows_duration_and_fps() {
        assert_eq!(config(None).total_frames(), 240);
        let mut cfg = config(None);
        cfg.duration_secs = 0.01;
        assert_eq!(cfg.total_frames(), 1);
    }

    #[test]
    fn silent_runs_disable_audio() {
        let args = config(None).ffmpeg_args();
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-stream_loop".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("uploads/video_test.mp4"));
    }

    #[test]
    fn soundtrack_is_looped_and_cut_to_duration() {
        let args = config(Some("uploads/music.mp3")).ffmpeg_args();
        let loop_idx = args.iter().position(|a| a == "-stream_loop").expect("loop flag");
        assert_eq!(args[loop_idx + 1], "-1");
        assert_eq!(args[loop_idx + 3], "uploads/music.mp3");
        assert!(args.windows(2).any(|w| w[0] == "-c:a" && w[1] == "aac"));
        assert!(args.windows(2).any(|w| w[0] == "-t" && w[1] == "10.000"));
        assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264"));
    }
}
