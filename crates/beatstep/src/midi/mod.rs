//! BeatStep MIDI vocabulary.

pub mod mapping;
pub mod sysex;

pub use mapping::BeatStepMapping;
