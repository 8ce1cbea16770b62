use super::canvas::{Canvas, PixelCanvas};
use super::{Frame, Visualization, BACKGROUND};

const LINE_WIDTH: f32 = 2.0;
const LINE_COLOR: [u8; 3] = [0, 0, 0];

/// Oscilloscope line of the time-domain bytes.
pub struct WaveformViz {
    canvas: PixelCanvas,
}

impl WaveformViz {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: PixelCanvas::new(width, height),
        }
    }
}

pub fn waveform_points(samples: &[u8], width: f32, height: f32) -> Vec<(f32, f32)> {
    let mut points = Vec::with_capacity(samples.len() + 1);
    if !samples.is_empty() {
        let slice_width = width / samples.len() as f32;
        let mut x = 0.0f32;
        for &sample in samples {
            let v = sample as f32 / 128.0;
            points.push((x, v * height / 2.0));
            x += slice_width;
        }
    }
    points.push((width, height / 2.0));
    points
}

impl Visualization for WaveformViz {
    fn name(&self) -> &'static str {
        "waveform"
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        let width = self.canvas.width() as f32;
        let height = self.canvas.height() as f32;
        self.canvas.fill_rect(0.0, 0.0, width, height, BACKGROUND);
        let points = waveform_points(frame.waveform, width, height);
        self.canvas.stroke_polyline(&points, LINE_WIDTH, LINE_COLOR);
    }

    fn canvas(&self) -> Option<&PixelCanvas> {
        Some(&self.canvas)
    }
}
