use std::collections::HashMap;

use super::notes::Note;

/// Default decay window before an unseen note is released.
pub const DEFAULT_HOLD_MS: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEvent {
    On(Note),
    Off(Note),
}

/// Set of currently held notes with time-based release.
///
/// A note is held if and only if it was observed within the last
/// `hold_ms` (inclusive at the boundary). Time is always supplied by the
/// caller, so the tracker is deterministic under synthetic timestamps.
#[derive(Debug)]
pub struct NoteTracker {
    hold_ms: f64,
    held: HashMap<Note, f64>,
}

impl NoteTracker {
    pub fn new(hold_ms: f64) -> Self {
        Self {
            hold_ms,
            held: HashMap::new(),
        }
    }

    /// Refresh every note seen this frame. Emits `On` for notes that were silent.
    pub fn observe(&mut self, notes: &[Note], now: f64) -> Vec<NoteEvent> {
        let mut events = Vec::new();
        for &note in notes {
            if self.held.insert(note, now).is_none() {
                events.push(NoteEvent::On(note));
            }
        }
        events
    }

    /// Release every note last seen before `now - hold_ms`.
    pub fn advance(&mut self, now: f64) -> Vec<NoteEvent> {
        let cutoff = now - self.hold_ms;

        // Collect first, then remove
        let mut expired: Vec<Note> = self
            .held
            .iter()
            .filter(|(_, &last_seen)| last_seen < cutoff)
            .map(|(&note, _)| note)
            .collect();
        expired.sort();

        for note in &expired {
            self.held.remove(note);
        }

        expired.into_iter().map(NoteEvent::Off).collect()
    }

    /// One frame: observe then expire.
    pub fn update(&mut self, notes: &[Note], now: f64) -> Vec<NoteEvent> {
        let mut events = self.observe(notes, now);
        events.extend(self.advance(now));
        events
    }

    pub fn is_held(&self, note: &Note) -> bool {
        self.held.contains_key(note)
    }

    /// Held notes in pitch order.
    pub fn held_notes(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self.held.keys().copied().collect();
        notes.sort();
        notes
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl Default for NoteTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::notes::PitchClass;

    const A4: Note = Note {
        pitch_class: PitchClass::A,
        octave: 4,
    };
    const C4: Note = Note {
        pitch_class: PitchClass::C,
        octave: 4,
    };

    #[test]
    fn note_on_fires_once_per_onset() {
        let mut tracker = NoteTracker::default();
        assert_eq!(tracker.update(&[A4], 0.0), vec![NoteEvent::On(A4)]);
        assert!(tracker.update(&[A4], 16.0).is_empty());
        assert!(tracker.is_held(&A4));
    }

    #[test]
    fn released_after_hold_window() {
        let mut tracker = NoteTracker::default();
        tracker.update(&[A4], 0.0);

        assert!(tracker.update(&[], 99.0).is_empty());
        assert!(tracker.is_held(&A4));
        assert!(tracker.update(&[], 100.0).is_empty());
        assert!(tracker.is_held(&A4));

        assert_eq!(tracker.update(&[], 101.0), vec![NoteEvent::Off(A4)]);
        assert!(!tracker.is_held(&A4));
        assert!(tracker.update(&[], 150.0).is_empty());
    }

    #[test]
    fn reappearance_resets_hold() {
        let mut tracker = NoteTracker::default();
        tracker.update(&[A4], 0.0);
        assert!(tracker.update(&[A4], 50.0).is_empty());

        assert!(tracker.update(&[], 101.0).is_empty());
        assert!(tracker.update(&[], 150.0).is_empty());
        assert!(tracker.is_held(&A4));
        assert_eq!(tracker.update(&[], 151.0), vec![NoteEvent::Off(A4)]);
    }

    #[test]
    fn duplicate_notes_in_one_frame_share_an_entry() {
        let mut tracker = NoteTracker::default();
        let events = tracker.update(&[A4, A4, C4], 0.0);
        assert_eq!(events, vec![NoteEvent::On(A4), NoteEvent::On(C4)]);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.held_notes(), vec![C4, A4]);
    }

    #[test]
    fn advance_alone_expires() {
        let mut tracker = NoteTracker::new(50.0);
        tracker.observe(&[C4, A4], 0.0);
        tracker.observe(&[A4], 40.0);
        assert_eq!(tracker.advance(60.0), vec![NoteEvent::Off(C4)]);
        assert_eq!(tracker.advance(91.0), vec![NoteEvent::Off(A4)]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn note_returns_after_release() {
        let mut tracker = NoteTracker::default();
        tracker.update(&[A4], 0.0);
        tracker.update(&[], 200.0);
        assert_eq!(tracker.update(&[A4], 210.0), vec![NoteEvent::On(A4)]);
    }
}
