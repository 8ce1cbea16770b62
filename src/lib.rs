//! Note and chord detection for spectrum-driven audio visualizations.
//!
//! Each frame's byte spectrum is reduced to its loudest peaks, mapped to
//! equal-tempered notes, and then either tracked as held piano keys or
//! named as a chord.

pub mod audio;
pub mod config;
pub mod detect;
pub mod encode;
pub mod error;
pub mod pending;
pub mod viz;
