use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while the engine talks to the outside world.
///
/// None of these stop the process: the runtime logs them and keeps handling
/// the next message.
#[derive(Debug, Error)]
pub enum CcPatchError {
    #[error("MIDI transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("no MIDI port matching \"{0}\"")]
    NoMatchingPort(String),

    #[error("malformed MIDI message: {0}")]
    MalformedMessage(String),

    #[error(transparent)]
    PatchFile(#[from] PatchFileError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Errors reading or writing a patch file.
#[derive(Debug, Error)]
pub enum PatchFileError {
    #[error("patch file {0} does not exist")]
    NotFound(PathBuf),

    #[error("failed to parse patch file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("patch file {path} has out-of-range entry: {detail}")]
    OutOfRange { path: PathBuf, detail: String },

    #[error("patch file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize patch: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Encoder table construction errors.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("encoder {0:#04x} appears more than once")]
    DuplicateEncoder(u8),

    #[error("control {0:#04x} is mapped to more than one encoder")]
    DuplicateControl(u8),

    #[error("control {0} is not a valid CC number")]
    ControlOutOfRange(u8),

    #[error("encoder {encoder:#04x} with pad offset {pad_offset:#04x} has no valid pad id")]
    PadOutOfRange { encoder: u8, pad_offset: u8 },
}
