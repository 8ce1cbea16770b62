pub mod chord;
pub mod notes;
pub mod peaks;
pub mod pipeline;
pub mod tracker;

pub use chord::{ChordResolver, DetectOptions, TemplateResolver};
pub use notes::{Note, PitchClass};
pub use peaks::PeakFilter;
pub use pipeline::NoteDetector;
pub use tracker::{NoteEvent, NoteTracker};
