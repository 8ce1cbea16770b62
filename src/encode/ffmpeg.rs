use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

pub struct VideoSettings {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: String,
    pub pix_fmt: String,
    pub crf: u32,
}

/// Pipes raw RGBA frames into ffmpeg, muxed with the source audio.
pub struct FfmpegEncoder {
    child: Child,
    frame_bytes: usize,
}

fn path_arg(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))
}

impl FfmpegEncoder {
    pub fn new(settings: &VideoSettings, input_audio: &Path) -> Result<Self> {
        let args = vec![
            "-y".to_string(),
            "-loglevel".into(), "error".into(),
            "-f".into(), "rawvideo".into(),
            "-pixel_format".into(), "rgba".into(),
            "-video_size".into(), format!("{}x{}", settings.width, settings.height),
            "-framerate".into(), settings.fps.to_string(),
            "-i".into(), "pipe:0".into(),
            "-i".into(), path_arg(input_audio)?,
            "-c:v".into(), settings.codec.clone(),
            "-pix_fmt".into(), settings.pix_fmt.clone(),
            "-crf".into(), settings.crf.to_string(),
            "-c:a".into(), "aac".into(),
            "-shortest".into(),
            path_arg(&settings.output)?,
        ];

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "FFmpeg encoder started: {}x{} @ {}fps, codec={}",
            settings.width, settings.height, settings.fps, settings.codec
        );

        Ok(Self {
            child,
            frame_bytes: settings.width as usize * settings.height as usize * 4,
        })
    }

    /// Write one frame made of equally wide canvases stacked top to bottom.
    pub fn write_stacked(&mut self, canvases: &[&[u8]]) -> Result<()> {
        let total: usize = canvases.iter().map(|c| c.len()).sum();
        if total != self.frame_bytes {
            anyhow::bail!("Frame is {} bytes, encoder expects {}", total, self.frame_bytes);
        }
        let stdin = self.child.stdin.as_mut().context("FFmpeg stdin not available")?;
        for pixels in canvases {
            stdin.write_all(pixels).context("Failed to write frame to ffmpeg")?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        // Close stdin to signal EOF
        drop(self.child.stdin.take());

        let output = self.child.wait_with_output().context("Failed to wait for ffmpeg")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("FFmpeg exited with error:\n{}", stderr);
        }

        log::info!("FFmpeg encoding complete");
        Ok(())
    }
}
