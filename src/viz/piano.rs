use crossbeam_channel::Sender;
use std::collections::BTreeSet;
use std::time::Duration;

use super::{Frame, Visualization};
use crate::detect::{Note, NoteDetector, NoteEvent, NoteTracker, PitchClass};
use crate::encode::events::OutputEvent;
use crate::pending::Pending;

/// Key-press feedback surface for the piano visualization.
pub trait Keyboard {
    fn key_down(&mut self, note: Note);
    fn key_up(&mut self, note: Note);
}

pub type BoxedKeyboard = Box<dyn Keyboard + Send>;

/// Lights keys for tracked notes. Does nothing until the keyboard is ready.
pub struct PianoViz {
    keyboard: Pending<BoxedKeyboard>,
    detector: NoteDetector,
    tracker: NoteTracker,
    reported_waiting: bool,
}

impl PianoViz {
    pub fn new(keyboard: Pending<BoxedKeyboard>, detector: NoteDetector, tracker: NoteTracker) -> Self {
        Self {
            keyboard,
            detector,
            tracker,
            reported_waiting: false,
        }
    }

    pub fn held_notes(&self) -> Vec<Note> {
        self.tracker.held_notes()
    }
}

impl Visualization for PianoViz {
    fn name(&self) -> &'static str {
        "piano"
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        let Some(keyboard) = self.keyboard.get_mut() else {
            if !self.reported_waiting {
                log::debug!("Keyboard not ready, skipping piano frames");
                self.reported_waiting = true;
            }
            return;
        };

        let notes = self.detector.detect(frame.frequency, frame.sample_rate);
        for event in self.tracker.update(&notes, frame.time_ms) {
            match event {
                NoteEvent::On(note) => keyboard.key_down(note),
                NoteEvent::Off(note) => keyboard.key_up(note),
            }
        }
    }
}

/// Lowest and highest keys of an 88-key piano.
const LOWEST_KEY: Note = Note {
    pitch_class: PitchClass::A,
    octave: 0,
};
const HIGHEST_KEY: Note = Note {
    pitch_class: PitchClass::C,
    octave: 8,
};

/// 88-key keyboard that forwards key changes as output events.
pub struct KeyboardWidget {
    pressed: BTreeSet<Note>,
    events: Sender<OutputEvent>,
}

impl KeyboardWidget {
    pub fn new(events: Sender<OutputEvent>) -> Self {
        Self {
            pressed: BTreeSet::new(),
            events,
        }
    }

    /// Build the widget off the frame path; the piano picks it up once delivered.
    pub fn load(events: Sender<OutputEvent>) -> Pending<BoxedKeyboard> {
        let (tx, pending) = Pending::channel();
        std::thread::spawn(move || {
            let widget: BoxedKeyboard = Box::new(KeyboardWidget::new(events));
            log::info!("Keyboard ready ({} to {})", LOWEST_KEY, HIGHEST_KEY);
            // The receiver is gone only if the piano was dropped first
            let _ = tx.send(widget);
        });
        pending
    }

    /// Load and wait up to `timeout` so the first frames are not dropped.
    pub fn load_and_wait(
        events: Sender<OutputEvent>,
        timeout: Duration,
    ) -> Pending<BoxedKeyboard> {
        let mut keyboard = Self::load(events);
        if !keyboard.wait(timeout) {
            log::warn!("Keyboard not ready after {:?}, piano starts without it", timeout);
        }
        keyboard
    }

    pub fn pressed(&self) -> impl Iterator<Item = &Note> {
        self.pressed.iter()
    }

    fn on_keyboard(note: &Note) -> bool {
        (LOWEST_KEY..=HIGHEST_KEY).contains(note)
    }

    fn emit(&self, event: OutputEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Event output closed");
        }
    }
}

impl Keyboard for KeyboardWidget {
    fn key_down(&mut self, note: Note) {
        if Self::on_keyboard(&note) && self.pressed.insert(note) {
            self.emit(OutputEvent::NoteOn { note });
        }
    }

    fn key_up(&mut self, note: Note) {
        if self.pressed.remove(&note) {
            self.emit(OutputEvent::NoteOff { note });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::PeakFilter;
    use std::sync::{Arc, Mutex};

    const SAMPLE_RATE: u32 = 44100;
    const A4: Note = Note {
        pitch_class: PitchClass::A,
        octave: 4,
    };

    #[derive(Clone, Default)]
    struct RecordingKeyboard {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Keyboard for RecordingKeyboard {
        fn key_down(&mut self, note: Note) {
            self.log.lock().unwrap().push(format!("down {}", note));
        }
        fn key_up(&mut self, note: Note) {
            self.log.lock().unwrap().push(format!("up {}", note));
        }
    }

    fn a4_spectrum(magnitude: u8) -> Vec<u8> {
        let mut spectrum = vec![0u8; 2048];
        spectrum[41] = magnitude;
        spectrum
    }

    fn frame(time_ms: f64, spectrum: &[u8]) -> Frame<'_> {
        Frame {
            time_ms,
            sample_rate: SAMPLE_RATE,
            frequency: spectrum,
            waveform: &[],
        }
    }

    fn piano(keyboard: Pending<BoxedKeyboard>) -> PianoViz {
        PianoViz::new(
            keyboard,
            NoteDetector::piano(10, PeakFilter::default()),
            NoteTracker::default(),
        )
    }

    #[test]
    fn key_down_then_up_after_hold() {
        let recorder = RecordingKeyboard::default();
        let log = recorder.log.clone();
        let mut viz = piano(Pending::ready(Box::new(recorder) as BoxedKeyboard));

        let loud = a4_spectrum(220);
        let silent = a4_spectrum(0);
        viz.draw(&frame(0.0, &loud));
        viz.draw(&frame(16.0, &loud));
        viz.draw(&frame(100.0, &silent));
        assert_eq!(viz.held_notes(), vec![A4]);
        viz.draw(&frame(117.0, &silent));
        viz.draw(&frame(200.0, &silent));

        assert_eq!(*log.lock().unwrap(), vec!["down A4", "up A4"]);
    }

    #[test]
    fn quiet_input_presses_nothing() {
        let recorder = RecordingKeyboard::default();
        let log = recorder.log.clone();
        let mut viz = piano(Pending::ready(Box::new(recorder) as BoxedKeyboard));
        viz.draw(&frame(0.0, &a4_spectrum(139)));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn no_op_until_keyboard_arrives() {
        let (tx, pending) = Pending::channel();
        let mut viz = piano(pending);
        let loud = a4_spectrum(220);

        viz.draw(&frame(0.0, &loud));
        assert!(viz.held_notes().is_empty());

        let recorder = RecordingKeyboard::default();
        let log = recorder.log.clone();
        tx.send(Box::new(recorder) as BoxedKeyboard).unwrap();
        viz.draw(&frame(16.0, &loud));
        assert_eq!(*log.lock().unwrap(), vec!["down A4"]);
    }

    #[test]
    fn widget_forwards_changes_once() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut widget = KeyboardWidget::new(tx);
        widget.key_down(A4);
        widget.key_down(A4);
        widget.key_up(A4);
        widget.key_up(A4);

        let events: Vec<OutputEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![OutputEvent::NoteOn { note: A4 }, OutputEvent::NoteOff { note: A4 }]
        );
        assert_eq!(widget.pressed().count(), 0);
    }

    #[test]
    fn widget_ignores_notes_off_the_keyboard() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut widget = KeyboardWidget::new(tx);
        let sub_bass = Note {
            pitch_class: PitchClass::C,
            octave: 0,
        };
        widget.key_down(sub_bass);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn first_frame_after_waiting_load_presses_key() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut viz = piano(KeyboardWidget::load_and_wait(tx, Duration::from_secs(5)));
        viz.draw(&frame(0.0, &a4_spectrum(220)));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![OutputEvent::NoteOn { note: A4 }]);
    }

    #[test]
    fn loaded_widget_becomes_ready() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut pending = KeyboardWidget::load(tx);
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !pending.is_ready() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        assert!(pending.is_ready());
    }
}
