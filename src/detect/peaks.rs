/// A local maximum picked from one frame's spectrum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub bin: usize,
    pub magnitude: f32,
}

/// Pick the `count` loudest distinct bins, loudest first.
///
/// Each round scans for the largest magnitude among bins not chosen yet,
/// keeping the first maximum on ties. Exclusion is by bin index, so two
/// equally loud bins can both be returned. Silent spectra still yield
/// `min(count, len)` zero-magnitude peaks; callers drop them with a floor.
pub fn extract_peaks<T>(spectrum: &[T], count: usize) -> Vec<Peak>
where
    T: Copy + Into<f32>,
{
    let rounds = count.min(spectrum.len());
    let mut visited = vec![false; spectrum.len()];
    let mut peaks = Vec::with_capacity(rounds);

    for _ in 0..rounds {
        let mut best: Option<Peak> = None;
        for (bin, &value) in spectrum.iter().enumerate() {
            if visited[bin] {
                continue;
            }
            let magnitude: f32 = value.into();
            if best.map_or(true, |b| magnitude > b.magnitude) {
                best = Some(Peak { bin, magnitude });
            }
        }
        let Some(peak) = best else {
            break;
        };
        visited[peak.bin] = true;
        peaks.push(peak);
    }

    peaks
}

/// Caller-side policy for discarding peaks that are not plausible notes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakFilter {
    /// Bins at or below this index are DC/sub-audio and never notes.
    pub min_bin: usize,
    /// Peaks must be strictly louder than this.
    pub loudness_threshold: f32,
}

impl PeakFilter {
    /// Only drops the zero-magnitude placeholders a silent frame produces.
    pub const SILENCE_ONLY: PeakFilter = PeakFilter {
        min_bin: 0,
        loudness_threshold: 0.0,
    };

    pub fn accepts(&self, peak: &Peak) -> bool {
        peak.bin > self.min_bin && peak.magnitude > self.loudness_threshold
    }

    pub fn apply(&self, peaks: &[Peak]) -> Vec<Peak> {
        peaks.iter().copied().filter(|p| self.accepts(p)).collect()
    }
}

impl Default for PeakFilter {
    fn default() -> Self {
        Self {
            min_bin: 20,
            loudness_threshold: 140.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_loudest_first() {
        let spectrum: Vec<u8> = vec![0, 10, 200, 30, 180, 5, 250, 0];
        let peaks = extract_peaks(&spectrum, 3);
        let bins: Vec<usize> = peaks.iter().map(|p| p.bin).collect();
        assert_eq!(bins, vec![6, 2, 4]);
        assert_eq!(peaks[0].magnitude, 250.0);
    }

    #[test]
    fn returns_min_of_count_and_len() {
        let spectrum: Vec<u8> = vec![3, 1, 2];
        assert_eq!(extract_peaks(&spectrum, 10).len(), 3);
        assert_eq!(extract_peaks(&spectrum, 2).len(), 2);
        assert_eq!(extract_peaks(&spectrum, 0).len(), 0);
        assert!(extract_peaks::<u8>(&[], 10).is_empty());
    }

    #[test]
    fn descending_and_distinct() {
        let spectrum: Vec<f32> = (0..512)
            .map(|i| ((i * 7919) % 256) as f32)
            .collect();
        let peaks = extract_peaks(&spectrum, 10);
        assert_eq!(peaks.len(), 10);
        for pair in peaks.windows(2) {
            assert!(pair[0].magnitude >= pair[1].magnitude);
        }
        let mut bins: Vec<usize> = peaks.iter().map(|p| p.bin).collect();
        bins.sort_unstable();
        bins.dedup();
        assert_eq!(bins.len(), 10);
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let spectrum: Vec<u8> = vec![1, 9, 4, 9, 9];
        let bins: Vec<usize> = extract_peaks(&spectrum, 3).iter().map(|p| p.bin).collect();
        assert_eq!(bins, vec![1, 3, 4]);
    }

    #[test]
    fn silent_spectrum_gives_zero_placeholders() {
        let spectrum = vec![0u8; 64];
        let peaks = extract_peaks(&spectrum, 10);
        assert_eq!(peaks.len(), 10);
        assert!(peaks.iter().all(|p| p.magnitude == 0.0));
        assert!(PeakFilter::SILENCE_ONLY.apply(&peaks).is_empty());
    }

    #[test]
    fn default_filter_drops_low_bins_and_quiet_peaks() {
        let filter = PeakFilter::default();
        assert!(!filter.accepts(&Peak { bin: 20, magnitude: 255.0 }));
        assert!(filter.accepts(&Peak { bin: 21, magnitude: 141.0 }));
        assert!(!filter.accepts(&Peak { bin: 40, magnitude: 140.0 }));
        assert!(!filter.accepts(&Peak { bin: 40, magnitude: 0.0 }));
    }
}
