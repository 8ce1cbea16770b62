mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use chordscope::audio;
use chordscope::audio::features::AnalyserSettings;
use chordscope::config::{self, Config};
use chordscope::detect::{DetectOptions, NoteDetector, NoteTracker, PeakFilter, TemplateResolver};
use chordscope::encode::events::{EventWriter, OutputEvent};
use chordscope::encode::ffmpeg::{FfmpegEncoder, VideoSettings};
use chordscope::pending::Pending;
use chordscope::viz::{self, Frame, Visualization};
use chordscope::viz::frequency::FrequencyViz;
use chordscope::viz::harmony::{self, BoxedResolver, ChordText, HarmonyViz};
use chordscope::viz::piano::{KeyboardWidget, PianoViz};
use chordscope::viz::waveform::WaveformViz;
use cli::Cli;

use std::time::Duration;

const KEYBOARD_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Explicit --config path, or auto-detect chordscope.toml / user config
    let config_path = cli.config.clone().or_else(config::find_config);
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            merge_config(&mut cli, cfg);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if cli.list_visualizations {
        println!("Available visualizations:");
        for name in viz::VISUALIZATIONS {
            println!("  {}", name);
        }
        return Ok(());
    }

    let settings = effective_config(&cli);
    settings.validate().context("Invalid settings")?;
    let selected = viz::resolve_selection(&cli.viz)?;

    let input = cli.input.as_ref().context("Input audio file is required")?;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    log::info!("chordscope - note and chord visualizer");
    log::info!("Input: {}", input.display());
    log::info!("Visualizations: {}", selected.join(", "));

    // 1. Decode audio
    log::info!("Decoding audio...");
    let audio_data = audio::decode::decode_audio(input)?;

    // 2. Analyse into per-frame byte spectra
    let analyser = AnalyserSettings {
        buffer_length: settings.analyser.buffer_length,
        smoothing: settings.analyser.smoothing,
        min_db: settings.analyser.min_db,
        max_db: settings.analyser.max_db,
    };
    log::info!("Analysing audio...");
    let (global, frames) = audio::analyser::analyse(&audio_data, &analyser, settings.output.fps)?;
    log::info!("Total frames: {}, Duration: {:.1}s", global.total_frames, global.duration);

    // 3. Build visualizations; collaborators report through one event channel
    let (event_tx, event_rx) = crossbeam_channel::unbounded::<OutputEvent>();
    let mut visualizations: Vec<Box<dyn Visualization>> = Vec::with_capacity(selected.len());
    for name in &selected {
        let visualization = build_visualization(name, &settings, &event_tx);
        log::debug!("Built visualization: {}", visualization.name());
        visualizations.push(visualization);
    }
    drop(event_tx);

    let mut event_writer = match cli.events {
        Some(ref path) => Some(EventWriter::create(path)?),
        None => None,
    };

    // 4. Optional video of the canvas visualizations, stacked vertically
    let canvas_count = visualizations.iter().filter(|v| v.canvas().is_some()).count();
    let mut encoder = match cli.video {
        Some(ref output) if canvas_count > 0 => {
            let video = VideoSettings {
                output: output.clone(),
                width: settings.output.width,
                height: settings.output.height * canvas_count as u32,
                fps: settings.output.fps,
                codec: settings.output.codec.clone(),
                pix_fmt: cli.pix_fmt.clone(),
                crf: settings.output.crf,
            };
            Some(FfmpegEncoder::new(&video, input)?)
        }
        Some(_) => {
            log::warn!("--video given but no canvas visualization selected; skipping video");
            None
        }
        None => None,
    };

    // 5. Frame loop
    let pb = ProgressBar::new(frames.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let mut note_ons = 0usize;
    let mut chord_changes = 0usize;

    for (frame_idx, spectrum) in frames.iter().enumerate() {
        let frame = Frame {
            time_ms: spectrum.time_ms,
            sample_rate: global.sample_rate,
            frequency: &spectrum.frequency,
            waveform: &spectrum.waveform,
        };
        for visualization in visualizations.iter_mut() {
            visualization.draw(&frame);
        }

        for event in event_rx.try_iter() {
            match &event {
                OutputEvent::NoteOn { note } => {
                    note_ons += 1;
                    log::debug!("{:>9.1}ms  key down {}", frame.time_ms, note);
                }
                OutputEvent::NoteOff { note } => {
                    log::debug!("{:>9.1}ms  key up   {}", frame.time_ms, note);
                }
                OutputEvent::Chord { label } => {
                    chord_changes += 1;
                    log::info!("{:>9.1}ms  {}", frame.time_ms, harmony::caption(label));
                }
            }
            if let Some(ref mut writer) = event_writer {
                writer.write(frame.time_ms, &event)?;
            }
        }

        if let Some(ref mut encoder) = encoder {
            let canvases: Vec<&[u8]> = visualizations
                .iter()
                .filter_map(|v| v.canvas())
                .map(|c| c.pixels())
                .collect();
            encoder.write_stacked(&canvases)?;
        }

        pb.set_position(frame_idx as u64 + 1);
    }

    pb.finish_with_message("Analysis complete");
    log::info!("{} note onsets, {} chord changes", note_ons, chord_changes);

    // 6. Flush outputs
    if let Some(writer) = event_writer {
        let written = writer.written();
        writer.finish()?;
        log::info!("Wrote {} events", written);
    }
    if let Some(encoder) = encoder {
        log::info!("Finishing encoding...");
        encoder.finish()?;
    }

    log::info!("Done!");
    Ok(())
}

fn build_visualization(
    name: &str,
    settings: &Config,
    events: &crossbeam_channel::Sender<OutputEvent>,
) -> Box<dyn Visualization> {
    let detection = &settings.detection;
    match name {
        "frequency" => Box::new(FrequencyViz::new(settings.output.width, settings.output.height)),
        "waveform" => Box::new(WaveformViz::new(settings.output.width, settings.output.height)),
        "piano" => Box::new(PianoViz::new(
            KeyboardWidget::load_and_wait(events.clone(), KEYBOARD_LOAD_TIMEOUT),
            NoteDetector::piano(
                detection.peak_count,
                PeakFilter {
                    min_bin: detection.min_bin,
                    loudness_threshold: detection.loudness_threshold,
                },
            ),
            NoteTracker::new(detection.hold_ms),
        )),
        _ => Box::new(HarmonyViz::new(
            Box::new(ChordText::new(events.clone())),
            Pending::ready(Box::new(TemplateResolver) as BoxedResolver),
            NoteDetector::harmony(detection.peak_count),
            DetectOptions {
                assume_perfect_fifth: settings.harmony.assume_perfect_fifth,
            },
        )),
    }
}

/// Config values apply only where the CLI is still at its default.
fn merge_config(cli: &mut Cli, cfg: Config) {
    if cli.width == config::default_width() { cli.width = cfg.output.width; }
    if cli.height == config::default_height() { cli.height = cfg.output.height; }
    if cli.fps == config::default_fps() { cli.fps = cfg.output.fps; }
    if cli.crf == config::default_crf() { cli.crf = cfg.output.crf; }
    if cli.codec == config::default_codec() { cli.codec = cfg.output.codec; }
    if cli.buffer_length == config::default_buffer_length() {
        cli.buffer_length = cfg.analyser.buffer_length;
    }
    if cli.smoothing == config::default_smoothing() { cli.smoothing = cfg.analyser.smoothing; }
    if cli.peaks == config::default_peak_count() { cli.peaks = cfg.detection.peak_count; }
    if cli.min_bin == config::default_min_bin() { cli.min_bin = cfg.detection.min_bin; }
    if cli.threshold == config::default_loudness_threshold() {
        cli.threshold = cfg.detection.loudness_threshold;
    }
    if cli.hold_ms == config::default_hold_ms() { cli.hold_ms = cfg.detection.hold_ms; }
    if !cli.no_assume_fifth {
        cli.no_assume_fifth = !cfg.harmony.assume_perfect_fifth;
    }
    if cli.min_db.is_none() { cli.min_db = Some(cfg.analyser.min_db); }
    if cli.max_db.is_none() { cli.max_db = Some(cfg.analyser.max_db); }
}

fn effective_config(cli: &Cli) -> Config {
    let defaults = config::AnalyserConfig::default();
    Config {
        analyser: config::AnalyserConfig {
            buffer_length: cli.buffer_length,
            smoothing: cli.smoothing,
            min_db: cli.min_db.unwrap_or(defaults.min_db),
            max_db: cli.max_db.unwrap_or(defaults.max_db),
        },
        detection: config::DetectionConfig {
            peak_count: cli.peaks,
            min_bin: cli.min_bin,
            loudness_threshold: cli.threshold,
            hold_ms: cli.hold_ms,
        },
        harmony: config::HarmonyConfig {
            assume_perfect_fifth: !cli.no_assume_fifth,
        },
        output: config::OutputConfig {
            width: cli.width,
            height: cli.height,
            fps: cli.fps,
            crf: cli.crf,
            codec: cli.codec.clone(),
        },
    }
}
