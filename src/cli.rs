use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chordscope", about = "Note and chord detection driven audio visualizer")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: Option<PathBuf>,

    /// Visualization to run (frequency, waveform, piano, harmony) or "all"
    #[arg(long, default_value = "all")]
    pub viz: String,

    /// Write note and chord events as JSON lines
    #[arg(short, long)]
    pub events: Option<PathBuf>,

    /// Render the frequency/waveform canvases to a video file (requires ffmpeg)
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 400)]
    pub height: u32,

    /// Visual frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Frequency bins per frame (half the FFT size)
    #[arg(long, default_value_t = 2048)]
    pub buffer_length: usize,

    /// Analyser smoothing time constant (0.0-1.0)
    #[arg(long, default_value_t = 0.8)]
    pub smoothing: f32,

    /// Decibel level mapped to spectrum value 0
    #[arg(long, allow_hyphen_values = true)]
    pub min_db: Option<f32>,

    /// Decibel level mapped to spectrum value 255
    #[arg(long, allow_hyphen_values = true)]
    pub max_db: Option<f32>,

    /// Spectrum peaks considered per frame
    #[arg(long, default_value_t = 10)]
    pub peaks: usize,

    /// Bins at or below this index are never piano notes
    #[arg(long, default_value_t = 20)]
    pub min_bin: usize,

    /// Piano loudness threshold on the 0-255 spectrum scale
    #[arg(long, default_value_t = 140.0)]
    pub threshold: f32,

    /// How long a piano key stays down after its note was last seen (ms)
    #[arg(long, default_value_t = 100.0)]
    pub hold_ms: f64,

    /// Do not assume a perfect fifth when naming chords
    #[arg(long)]
    pub no_assume_fifth: bool,

    /// Config file (defaults to chordscope.toml or the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// List available visualizations and exit
    #[arg(long)]
    pub list_visualizations: bool,

    /// H.264 CRF quality (0-51, lower = better)
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,
}
