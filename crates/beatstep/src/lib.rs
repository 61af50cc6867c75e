//! Arturia BeatStep support for ccpatch.
//!
//! # Architecture
//!
//! - [`midi`]: the device's sysex vocabulary, encoder table and function pads
//! - [`BeatStep`]: that vocabulary behind the engine's `ControlSurface` seam
//! - [`MidiPorts`]: midir connections to the controller and the instrument
//! - [`BeatStepModule`]: ports, surface and engine wired into one loop
//!
//! Port names are matched by substring, so "BeatStep" finds "Arturia BeatStep
//! MIDI 1" on any platform.

pub mod midi;
pub mod module;
pub mod ports;
pub mod surface;

pub use module::BeatStepModule;
pub use ports::MidiPorts;
pub use surface::BeatStep;
