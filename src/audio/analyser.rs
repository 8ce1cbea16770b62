use anyhow::Result;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

use super::decode::AudioData;
use super::features::{AnalyserSettings, GlobalAnalysis, SpectrumFrame};

pub fn analyse(
    audio: &AudioData,
    settings: &AnalyserSettings,
    fps: u32,
) -> Result<(GlobalAnalysis, Vec<SpectrumFrame>)> {
    if fps == 0 {
        anyhow::bail!("fps must be at least 1");
    }
    let samples = &audio.samples;
    let sr = audio.sample_rate;
    let duration = samples.len() as f32 / sr as f32;
    let total_frames = (duration * fps as f32).ceil() as usize;

    log::info!(
        "Pass 1: Per-frame FFT ({} frames, fft size {})...",
        total_frames,
        settings.fft_size()
    );
    let raw = pass1_magnitudes(samples, sr, fps, total_frames, settings.fft_size());

    log::info!("Pass 2: Smoothing & byte scaling (smoothing={:.2})...", settings.smoothing);
    let frames = pass2_smooth(&raw, samples, sr, fps, settings);

    let global = GlobalAnalysis {
        sample_rate: sr,
        duration,
        total_frames,
    };
    Ok((global, frames))
}

/// Last sample index (exclusive) covered by frame `frame_idx`.
fn frame_end(frame_idx: usize, sample_rate: u32, fps: u32) -> usize {
    (frame_idx as f64 * sample_rate as f64 / fps as f64).round() as usize
}

/// The `size` samples ending at `end`, zero-padded where they fall outside the audio.
fn window_samples(samples: &[f32], end: usize, size: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; size];
    let start = end as isize - size as isize;
    for (i, slot) in out.iter_mut().enumerate() {
        let idx = start + i as isize;
        if idx >= 0 && (idx as usize) < samples.len() {
            *slot = samples[idx as usize];
        }
    }
    out
}

/// Unsmoothed linear magnitudes `|X[k]| / N` for the lower half of each frame's FFT.
fn pass1_magnitudes(
    samples: &[f32],
    sample_rate: u32,
    fps: u32,
    total_frames: usize,
    fft_size: usize,
) -> Vec<Vec<f32>> {
    let window = blackman_window(fft_size);
    let half = fft_size / 2;

    (0..total_frames)
        .into_par_iter()
        .map(|frame_idx| {
            let end = frame_end(frame_idx, sample_rate, fps);
            let mut buffer: Vec<Complex<f32>> = window_samples(samples, end, fft_size)
                .iter()
                .zip(window.iter())
                .map(|(&s, &w)| Complex::new(s * w, 0.0))
                .collect();

            // Per-thread FFT planner (rayon-safe)
            let mut planner = FftPlanner::<f32>::new();
            let fft = planner.plan_fft_forward(fft_size);
            fft.process(&mut buffer);

            buffer[..half]
                .iter()
                .map(|c| c.norm() / fft_size as f32)
                .collect()
        })
        .collect()
}

/// Exponential smoothing across frames, then decibel and byte conversion.
fn pass2_smooth(
    raw: &[Vec<f32>],
    samples: &[f32],
    sample_rate: u32,
    fps: u32,
    settings: &AnalyserSettings,
) -> Vec<SpectrumFrame> {
    let tau = settings.smoothing;
    let mut smoothed = vec![0.0f32; settings.buffer_length];
    let mut frames = Vec::with_capacity(raw.len());

    for (frame_idx, magnitudes) in raw.iter().enumerate() {
        for (s, &m) in smoothed.iter_mut().zip(magnitudes.iter()) {
            *s = tau * *s + (1.0 - tau) * m;
        }

        let frequency = smoothed
            .iter()
            .map(|&m| magnitude_to_byte(m, settings.min_db, settings.max_db))
            .collect();

        let end = frame_end(frame_idx, sample_rate, fps);
        let waveform = window_samples(samples, end, settings.buffer_length)
            .iter()
            .map(|&s| sample_to_byte(s))
            .collect();

        frames.push(SpectrumFrame {
            time_ms: frame_idx as f64 * 1000.0 / fps as f64,
            frequency,
            waveform,
        });
    }

    frames
}

fn magnitude_to_byte(magnitude: f32, min_db: f32, max_db: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - min_db) / (max_db - min_db);
    scaled.floor().clamp(0.0, 255.0) as u8
}

fn sample_to_byte(sample: f32) -> u8 {
    (128.0 * (1.0 + sample)).floor().clamp(0.0, 255.0) as u8
}

fn blackman_window(size: usize) -> Vec<f32> {
    let alpha = 0.16f32;
    let a0 = 0.5 * (1.0 - alpha);
    let a1 = 0.5;
    let a2 = 0.5 * alpha;
    (0..size)
        .map(|i| {
            let x = i as f32 / size as f32;
            a0 - a1 * (2.0 * std::f32::consts::PI * x).cos()
                + a2 * (4.0 * std::f32::consts::PI * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Note, NoteDetector, PeakFilter, PitchClass};

    fn sine(frequency: f32, amplitude: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| {
                amplitude
                    * (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate as f32).sin()
            })
            .collect()
    }

    #[test]
    fn byte_scaling() {
        assert_eq!(magnitude_to_byte(0.0, -100.0, -30.0), 0);
        // -30 dB and above saturate
        assert_eq!(magnitude_to_byte(0.1, -100.0, -30.0), 255);
        // -65 dB is the middle of the range
        let mid = magnitude_to_byte(10f32.powf(-65.0 / 20.0), -100.0, -30.0);
        assert!((126..=128).contains(&mid));
        assert_eq!(magnitude_to_byte(1e-7, -100.0, -30.0), 0);
    }

    #[test]
    fn waveform_bytes() {
        assert_eq!(sample_to_byte(0.0), 128);
        assert_eq!(sample_to_byte(1.0), 255);
        assert_eq!(sample_to_byte(-1.0), 0);
        assert_eq!(sample_to_byte(-0.5), 64);
    }

    #[test]
    fn window_is_zero_padded() {
        let samples = vec![1.0f32; 4];
        assert_eq!(window_samples(&samples, 2, 4), vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(window_samples(&samples, 6, 4), vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn frame_count_and_timing() {
        let audio = AudioData {
            samples: vec![0.0; 44100],
            sample_rate: 44100,
        };
        let (global, frames) = analyse(&audio, &AnalyserSettings::default(), 60).unwrap();
        assert_eq!(global.total_frames, 60);
        assert_eq!(frames.len(), 60);
        assert_eq!(frames[0].frequency.len(), 2048);
        assert_eq!(frames[0].waveform.len(), 2048);
        assert!((frames[30].time_ms - 500.0).abs() < 1e-9);
        assert!(frames.iter().all(|f| f.frequency.iter().all(|&b| b == 0)));
        assert!(frames.iter().all(|f| f.waveform.iter().all(|&b| b == 128)));
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let sample_rate = 44100;
        let audio = AudioData {
            samples: sine(440.0, 0.05, sample_rate, 0.5),
            sample_rate,
        };
        let (_, frames) = analyse(&audio, &AnalyserSettings::default(), 20).unwrap();
        let frame = &frames[frames.len() - 1];

        let loudest = frame
            .frequency
            .iter()
            .enumerate()
            .max_by_key(|&(i, &v)| (v, std::cmp::Reverse(i)))
            .map(|(i, _)| i)
            .unwrap();
        assert!((40..=42).contains(&loudest), "loudest bin {}", loudest);

        let notes = NoteDetector::piano(10, PeakFilter::default()).detect(&frame.frequency, sample_rate);
        assert_eq!(
            notes.first(),
            Some(&Note {
                pitch_class: PitchClass::A,
                octave: 4
            })
        );
    }
}
