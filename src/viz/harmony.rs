use crossbeam_channel::Sender;

use super::{Frame, Visualization};
use crate::detect::{ChordResolver, DetectOptions, NoteDetector};
use crate::encode::events::OutputEvent;
use crate::pending::Pending;

/// Text surface showing the current chord guess.
pub trait ChordDisplay {
    fn set_chord_text(&mut self, label: &str);
}

pub type BoxedResolver = Box<dyn ChordResolver + Send>;

/// Names the chord of every frame. Stateless apart from what the display keeps.
pub struct HarmonyViz {
    display: Box<dyn ChordDisplay>,
    resolver: Pending<BoxedResolver>,
    detector: NoteDetector,
    options: DetectOptions,
    reported_waiting: bool,
}

impl HarmonyViz {
    pub fn new(
        display: Box<dyn ChordDisplay>,
        resolver: Pending<BoxedResolver>,
        detector: NoteDetector,
        options: DetectOptions,
    ) -> Self {
        Self {
            display,
            resolver,
            detector,
            options,
            reported_waiting: false,
        }
    }
}

impl Visualization for HarmonyViz {
    fn name(&self) -> &'static str {
        "harmony"
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        let Some(resolver) = self.resolver.get() else {
            if !self.reported_waiting {
                log::debug!("Chord resolver not ready, skipping harmony frames");
                self.reported_waiting = true;
            }
            return;
        };

        let notes = self.detector.detect(frame.frequency, frame.sample_rate);
        let chord = resolver.detect(&notes, &self.options).join(" ");
        if !chord.is_empty() {
            log::debug!("{:.0}ms: {:?} -> {}", frame.time_ms, notes, chord);
            self.display.set_chord_text(&chord);
        }
    }
}

/// Caption text shown for a chord label.
pub fn caption(label: &str) -> String {
    format!("The currently playing chord seems to be {}", label)
}

/// Chord caption that forwards each change of text as an output event.
pub struct ChordText {
    current: Option<String>,
    events: Sender<OutputEvent>,
}

impl ChordText {
    pub fn new(events: Sender<OutputEvent>) -> Self {
        Self {
            current: None,
            events,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl ChordDisplay for ChordText {
    fn set_chord_text(&mut self, label: &str) {
        if self.current.as_deref() == Some(label) {
            return;
        }
        self.current = Some(label.to_string());
        if self.events.send(OutputEvent::Chord { label: label.to_string() }).is_err() {
            log::debug!("Event output closed");
        }
    }
}
