pub mod canvas;
pub mod frequency;
pub mod harmony;
pub mod piano;
pub mod waveform;

use crate::error::ConfigError;
use canvas::{PixelCanvas, Rgb};

pub const BACKGROUND: Rgb = [200, 200, 200];

/// Everything a visualization sees for one tick. Borrowed, never retained.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub time_ms: f64,
    pub sample_rate: u32,
    /// Byte spectrum, `buffer_length` bins from DC to Nyquist
    pub frequency: &'a [u8],
    /// Byte time-domain samples
    pub waveform: &'a [u8],
}

pub trait Visualization {
    fn name(&self) -> &'static str;
    fn draw(&mut self, frame: &Frame<'_>);

    /// Pixels for visualizations that paint a canvas.
    fn canvas(&self) -> Option<&PixelCanvas> {
        None
    }
}

pub const VISUALIZATIONS: [&str; 4] = ["frequency", "waveform", "piano", "harmony"];

/// Expand "all" or a comma-separated list into known visualization names.
pub fn resolve_selection(selection: &str) -> Result<Vec<&'static str>, ConfigError> {
    if selection.trim() == "all" {
        return Ok(VISUALIZATIONS.to_vec());
    }

    let mut names = Vec::new();
    for requested in selection.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let name = VISUALIZATIONS
            .iter()
            .copied()
            .find(|n| n.eq_ignore_ascii_case(requested))
            .ok_or_else(|| ConfigError::UnknownVisualization {
                name: requested.to_string(),
                available: VISUALIZATIONS.join(", "),
            })?;
        if !names.contains(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Err(ConfigError::UnknownVisualization {
            name: selection.to_string(),
            available: VISUALIZATIONS.join(", "),
        });
    }
    Ok(names)
}
