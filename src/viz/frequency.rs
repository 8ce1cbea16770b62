use super::canvas::{Canvas, PixelCanvas};
use super::{Frame, Visualization, BACKGROUND};

/// Bar chart of the byte spectrum, one bar per bin.
pub struct FrequencyViz {
    canvas: PixelCanvas,
}

impl FrequencyViz {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: PixelCanvas::new(width, height),
        }
    }
}

/// Bars are wider than width/bins so the audible low end fills the view.
pub fn draw_bars(canvas: &mut impl Canvas, spectrum: &[u8]) {
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    canvas.fill_rect(0.0, 0.0, width, height, BACKGROUND);
    if spectrum.is_empty() {
        return;
    }

    let bar_width = (width / spectrum.len() as f32) * 2.5;
    let mut x = 0.0f32;
    for &value in spectrum {
        if x >= width {
            break;
        }
        let bar_height = value as f32 / 2.0;
        let red = value.saturating_add(100);
        canvas.fill_rect(x, height - bar_height, bar_width, bar_height, [red, 50, 50]);
        x += bar_width + 1.0;
    }
}

impl Visualization for FrequencyViz {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        draw_bars(&mut self.canvas, frame.frequency);
    }

    fn canvas(&self) -> Option<&PixelCanvas> {
        Some(&self.canvas)
    }
}
