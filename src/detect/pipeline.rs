use super::notes::{bin_to_frequency, Note};
use super::peaks::{extract_peaks, Peak, PeakFilter};

/// Number of peaks considered per frame.
pub const DEFAULT_PEAK_COUNT: usize = 10;

/// Spectrum → ranked notes, under a given filtering policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteDetector {
    pub peak_count: usize,
    pub filter: PeakFilter,
}

impl NoteDetector {
    /// Piano policy: drop sub-audio bins and anything under the loudness threshold.
    pub fn piano(peak_count: usize, filter: PeakFilter) -> Self {
        Self { peak_count, filter }
    }

    /// Harmony policy: rank every peak, drop only silent placeholders.
    pub fn harmony(peak_count: usize) -> Self {
        Self {
            peak_count,
            filter: PeakFilter::SILENCE_ONLY,
        }
    }

    /// Peaks that pass the filter, loudest first.
    pub fn candidate_peaks<T>(&self, spectrum: &[T]) -> Vec<Peak>
    where
        T: Copy + Into<f32>,
    {
        let mut peaks = self.filter.apply(&extract_peaks(spectrum, self.peak_count));
        // Stable, so equal magnitudes keep their scan order
        peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
        peaks
    }

    /// Notes for one frame, loudest source peak first.
    ///
    /// Distinct bins can land on the same note; repeats are kept.
    pub fn detect<T>(&self, spectrum: &[T], sample_rate: u32) -> Vec<Note>
    where
        T: Copy + Into<f32>,
    {
        let buffer_len = spectrum.len();
        self.candidate_peaks(spectrum)
            .iter()
            .filter_map(|peak| {
                Note::from_frequency(bin_to_frequency(peak.bin, buffer_len, sample_rate))
            })
            .collect()
    }
}
