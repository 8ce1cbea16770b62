use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::detect::{Note, NoteEvent};

/// Signals the piano keyboard and chord display forward to the output.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    NoteOn { note: Note },
    NoteOff { note: Note },
    Chord { label: String },
}

impl From<NoteEvent> for OutputEvent {
    fn from(event: NoteEvent) -> Self {
        match event {
            NoteEvent::On(note) => OutputEvent::NoteOn { note },
            NoteEvent::Off(note) => OutputEvent::NoteOff { note },
        }
    }
}

#[derive(Serialize)]
struct Record<'a> {
    time_ms: f64,
    #[serde(flatten)]
    event: &'a OutputEvent,
}

/// JSON-lines writer, one record per event.
pub struct EventWriter<W: Write> {
    out: W,
    written: usize,
}

impl EventWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create events file: {}", path.display()))?;
        log::info!("Writing events to {}", path.display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> EventWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write(&mut self, time_ms: f64, event: &OutputEvent) -> Result<()> {
        serde_json::to_writer(&mut self.out, &Record { time_ms, event })
            .context("Failed to serialize event")?;
        self.out.write_all(b"\n").context("Failed to write event")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush().context("Failed to flush events")?;
        Ok(self.out)
    }
}
