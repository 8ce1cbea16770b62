/// One analyser snapshot, in the 0-255 byte scale a browser analyser reports.
#[derive(Clone, Debug)]
pub struct SpectrumFrame {
    /// Frame timestamp in milliseconds from the start of the audio
    pub time_ms: f64,
    /// Smoothed magnitude per bin, decibel-scaled into 0-255 (buffer_length bins)
    pub frequency: Vec<u8>,
    /// Most recent time-domain samples, 128 = silence
    pub waveform: Vec<u8>,
}

/// Settings of the spectrum analyser producing `SpectrumFrame`s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalyserSettings {
    pub buffer_length: usize,
    pub smoothing: f32,
    pub min_db: f32,
    pub max_db: f32,
}

impl AnalyserSettings {
    pub fn fft_size(&self) -> usize {
        self.buffer_length * 2
    }
}

impl Default for AnalyserSettings {
    fn default() -> Self {
        Self {
            buffer_length: 2048,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GlobalAnalysis {
    pub sample_rate: u32,
    pub duration: f32,
    pub total_frames: usize,
}
