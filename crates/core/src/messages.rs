use crate::channel::Channel;
use crate::error::CcPatchError;
use crate::layout::Control;
use crate::patch::Patch;

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;
const CONTROL_CHANGE: u8 = 0xB0;

/// MIDI Machine Control "Stop" (universal real-time sysex), sent by the
/// controller's transport stop button. Used as the save trigger.
pub const MMC_STOP: [u8; 6] = [SYSEX_START, 0x7F, 0x7F, 0x06, 0x01, SYSEX_END];

/// Inbound MIDI messages the engine understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    ControlChange {
        channel: Channel,
        control: Control,
        value: u8,
    },
    /// Full sysex message, `F0` and `F7` included.
    Sysex(Vec<u8>),
}

impl MidiMessage {
    /// Classify raw bytes as delivered by the transport.
    pub fn parse(bytes: &[u8]) -> Result<Self, CcPatchError> {
        let Some(&status) = bytes.first() else {
            return Err(CcPatchError::MalformedMessage("empty message".to_string()));
        };

        if status == SYSEX_START {
            return Ok(MidiMessage::Sysex(bytes.to_vec()));
        }

        if status & 0xF0 == CONTROL_CHANGE {
            if bytes.len() < 3 || bytes[1] > 0x7F || bytes[2] > 0x7F {
                return Err(CcPatchError::MalformedMessage(format!(
                    "truncated control change {:02X?}",
                    bytes
                )));
            }
            return Ok(MidiMessage::ControlChange {
                channel: Channel::from_status(status),
                control: bytes[1],
                value: bytes[2],
            });
        }

        Err(CcPatchError::MalformedMessage(format!(
            "unsupported status byte {:#04x}",
            status
        )))
    }
}

/// Side effects requested by the engine. The runtime carries them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// Sysex for the controller (freeze, unfreeze, pad colors, channel select).
    ControllerSysex(Vec<u8>),
    /// CC broadcast to the instrument port.
    InstrumentControlChange {
        channel: Channel,
        control: Control,
        value: u8,
    },
    /// Persist this snapshot of the patch.
    SavePatch(Patch),
}

/// Encode a control change for the wire.
pub fn control_change_bytes(channel: Channel, control: Control, value: u8) -> [u8; 3] {
    [CONTROL_CHANGE | channel.get(), control & 0x7F, value & 0x7F]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_control_change() {
        let message = MidiMessage::parse(&[0xB3, 20, 64]).unwrap();
        assert_eq!(
            message,
            MidiMessage::ControlChange {
                channel: Channel::new(3).unwrap(),
                control: 20,
                value: 64,
            }
        );
    }

    #[test]
    fn test_parse_sysex_keeps_all_bytes() {
        let message = MidiMessage::parse(&MMC_STOP).unwrap();
        assert_eq!(message, MidiMessage::Sysex(MMC_STOP.to_vec()));
    }

    #[test]
    fn test_note_messages_are_rejected() {
        let err = MidiMessage::parse(&[0x90, 60, 100]).unwrap_err();
        assert!(matches!(err, CcPatchError::MalformedMessage(_)));
    }

    #[test]
    fn test_truncated_control_change_is_rejected() {
        assert!(MidiMessage::parse(&[0xB0, 20]).is_err());
        assert!(MidiMessage::parse(&[]).is_err());
    }

    #[test]
    fn test_control_change_bytes() {
        let channel = Channel::new(2).unwrap();
        assert_eq!(control_change_bytes(channel, 0x0C, 90), [0xB2, 0x0C, 90]);
    }
}
