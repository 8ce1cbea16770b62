use serde::Serialize;
use std::fmt;

/// Twelve equal-tempered pitch classes, indexed from C.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

const PITCH_CLASSES: [PitchClass; 12] = [
    PitchClass::C,
    PitchClass::CSharp,
    PitchClass::D,
    PitchClass::DSharp,
    PitchClass::E,
    PitchClass::F,
    PitchClass::FSharp,
    PitchClass::G,
    PitchClass::GSharp,
    PitchClass::A,
    PitchClass::ASharp,
    PitchClass::B,
];

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

impl PitchClass {
    /// Semitones above C (0-11).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Pitch class `semitones` above index 0, wrapping around the octave.
    pub fn from_index(semitones: usize) -> Self {
        PITCH_CLASSES[semitones % 12]
    }

    pub fn transpose(self, semitones: usize) -> Self {
        Self::from_index(self.index() + semitones)
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.index()]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pitch class in a specific octave (scientific pitch notation, A4 = 440 Hz).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Note {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl Note {
    /// Nearest equal-tempered note to `frequency`.
    ///
    /// Returns `None` for non-positive or non-finite input, where the
    /// logarithm is undefined.
    pub fn from_frequency(frequency: f32) -> Option<Self> {
        let midi = frequency_to_midi(frequency)?;
        Some(Self {
            pitch_class: PitchClass::from_index(midi.rem_euclid(12) as usize),
            octave: midi.div_euclid(12) - 1,
        })
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.octave, self.pitch_class).cmp(&(other.octave, other.pitch_class))
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

impl Serialize for Note {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Centre frequency of a spectrum bin. `buffer_len` bins span 0..Nyquist.
pub fn bin_to_frequency(bin: usize, buffer_len: usize, sample_rate: u32) -> f32 {
    if buffer_len == 0 {
        return 0.0;
    }
    let nyquist = sample_rate as f32 / 2.0;
    bin as f32 * nyquist / buffer_len as f32
}

fn frequency_to_midi(frequency: f32) -> Option<i32> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }
    let semitones = 12.0 * (frequency / 440.0).log2();
    Some(semitones.round() as i32 + 69)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(pitch_class: PitchClass, octave: i32) -> Note {
        Note { pitch_class, octave }
    }

    #[test]
    fn concert_a() {
        assert_eq!(Note::from_frequency(440.0), Some(note(PitchClass::A, 4)));
    }

    #[test]
    fn middle_c() {
        assert_eq!(Note::from_frequency(261.63), Some(note(PitchClass::C, 4)));
    }

    #[test]
    fn octave_boundaries() {
        assert_eq!(Note::from_frequency(246.94), Some(note(PitchClass::B, 3)));
        assert_eq!(Note::from_frequency(523.25), Some(note(PitchClass::C, 5)));
        assert_eq!(Note::from_frequency(27.5), Some(note(PitchClass::A, 0)));
    }

    #[test]
    fn rounds_to_nearest_semitone() {
        // A quarter tone below A4 still rounds to A4, just over rounds to G#4
        assert_eq!(Note::from_frequency(430.0), Some(note(PitchClass::A, 4)));
        assert_eq!(Note::from_frequency(425.0), Some(note(PitchClass::GSharp, 4)));
    }

    #[test]
    fn very_low_frequency_stays_well_formed() {
        // midi -12
        assert_eq!(Note::from_frequency(4.0), Some(note(PitchClass::C, -2)));
    }

    #[test]
    fn non_positive_frequency_is_no_note() {
        assert_eq!(Note::from_frequency(0.0), None);
        assert_eq!(Note::from_frequency(-10.0), None);
        assert_eq!(Note::from_frequency(f32::NAN), None);
        assert_eq!(Note::from_frequency(f32::INFINITY), None);
    }

    #[test]
    fn conversion_is_pure() {
        let a = Note::from_frequency(329.63);
        let b = Note::from_frequency(329.63);
        assert_eq!(a, b);
        assert_eq!(a, Some(note(PitchClass::E, 4)));
    }

    #[test]
    fn display_uses_sharps() {
        assert_eq!(note(PitchClass::CSharp, 3).to_string(), "C#3");
        assert_eq!(note(PitchClass::A, 4).to_string(), "A4");
        assert_eq!(note(PitchClass::B, -1).to_string(), "B-1");
    }

    #[test]
    fn bin_frequency() {
        let f = bin_to_frequency(41, 2048, 44100);
        assert!((f - 441.43).abs() < 0.01);
        assert_eq!(bin_to_frequency(0, 2048, 44100), 0.0);
        assert_eq!(bin_to_frequency(2048, 2048, 44100), 22050.0);
        assert_eq!(bin_to_frequency(5, 0, 44100), 0.0);
    }

    #[test]
    fn pitch_class_transpose_wraps() {
        assert_eq!(PitchClass::A.transpose(3), PitchClass::C);
        assert_eq!(PitchClass::C.transpose(7), PitchClass::G);
        assert_eq!(PitchClass::B.transpose(12), PitchClass::B);
    }
}
