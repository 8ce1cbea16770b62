use super::notes::{Note, PitchClass};

/// Hints passed along with the note list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectOptions {
    /// Treat a missing fifth above the root as present, so that two-note
    /// input like C+E can still be named.
    pub assume_perfect_fifth: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            assume_perfect_fifth: true,
        }
    }
}

/// Names the chord formed by a set of notes.
///
/// `notes` are ordered by importance (loudest first) and may contain
/// repeats. An empty result means no known chord fits.
pub trait ChordResolver {
    fn detect(&self, notes: &[Note], options: &DetectOptions) -> Vec<String>;
}

/// (quality label, semitone intervals above the root)
const CHORD_TYPES: &[(&str, &[usize])] = &[
    ("Major", &[0, 4, 7]),
    ("Minor", &[0, 3, 7]),
    ("Fifth", &[0, 7]),
    ("Augmented", &[0, 4, 8]),
    ("Diminished", &[0, 3, 6]),
    ("Sus2", &[0, 2, 7]),
    ("Sus4", &[0, 5, 7]),
    ("Major6", &[0, 4, 7, 9]),
    ("Minor6", &[0, 3, 7, 9]),
    ("Dominant7", &[0, 4, 7, 10]),
    ("Major7", &[0, 4, 7, 11]),
    ("Minor7", &[0, 3, 7, 10]),
    ("Diminished7", &[0, 3, 6, 9]),
    ("HalfDiminished7", &[0, 3, 6, 10]),
];

const PERFECT_FIFTH: usize = 7;

/// 12-bit pitch-class set, bit `i` = `i` semitones above C.
type Chroma = u16;

fn chroma_of(root: PitchClass, intervals: &[usize]) -> Chroma {
    intervals
        .iter()
        .fold(0, |acc, &i| acc | 1 << root.transpose(i).index())
}

/// Built-in resolver matching pitch-class sets against a fixed chord table.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateResolver;

struct Candidate {
    label: String,
    inverted: bool,
    assumed_fifth: bool,
    order: usize,
}

impl ChordResolver for TemplateResolver {
    fn detect(&self, notes: &[Note], options: &DetectOptions) -> Vec<String> {
        let mut classes: Vec<PitchClass> = Vec::new();
        for note in notes {
            if !classes.contains(&note.pitch_class) {
                classes.push(note.pitch_class);
            }
        }
        if classes.len() < 2 {
            return Vec::new();
        }

        let bass = classes[0];
        let input: Chroma = classes.iter().fold(0, |acc, pc| acc | 1 << pc.index());

        let mut candidates = Vec::new();
        for &root in &classes {
            let fifth: Chroma = 1 << root.transpose(PERFECT_FIFTH).index();
            for (order, (quality, intervals)) in CHORD_TYPES.iter().enumerate() {
                let chord = chroma_of(root, intervals);
                let assumed_fifth = if chord == input {
                    false
                } else if options.assume_perfect_fifth && input & fifth == 0 && chord == input | fifth {
                    true
                } else {
                    continue;
                };

                let inverted = root != bass;
                let label = if inverted {
                    format!("{} {}/{}", root, quality, bass)
                } else {
                    format!("{} {}", root, quality)
                };
                candidates.push(Candidate {
                    label,
                    inverted,
                    assumed_fifth,
                    order,
                });
            }
        }

        candidates.sort_by_key(|c| (c.inverted, c.assumed_fifth, c.order));
        candidates.into_iter().map(|c| c.label).collect()
    }
}
