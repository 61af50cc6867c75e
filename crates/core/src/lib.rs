pub use calibration::{freeze_range, Calibration, CalibrationState, Observation, UnlockPolicy};
pub use channel::{Channel, ChannelBoundary, ChannelController, Direction};
pub use config::{ConfigError, ConfigManager, Settings};
pub use engine::{Action, Engine, EngineConfig};
pub use error::{CcPatchError, LayoutError, PatchFileError};
pub use layout::{Control, Encoder, Pad, SurfaceLayout};
pub use leds::LedState;
pub use listeners::{Listener, ListenerRegistry, Trigger};
pub use matcher::{match_sysex, SysexPattern};
pub use messages::{control_change_bytes, MidiMessage, Outgoing, MMC_STOP};
pub use patch::{Patch, PatchDirectory, DEFAULT_VALUE};
pub use runtime::{Runtime, Transport};
pub use surface::{ControlSurface, PadColor};

mod calibration;
mod channel;
mod config;
mod engine;
mod error;
mod layout;
mod leds;
mod listeners;
mod matcher;
pub mod messages;
pub mod patch;
mod runtime;
mod surface;

#[cfg(test)]
mod test_support;
