//! BeatStep parameter sysex.
//!
//! Every parameter message has the shape
//! `F0 00 20 6B 7F 42 <command> 00 <parameter> <id> [<value>] F7`, where the
//! command is `02` to set and `01` to get.

use ccpatch_core::messages::{SYSEX_END, SYSEX_START};
use ccpatch_core::SysexPattern;

/// Arturia manufacturer id, device id and model.
pub const HEADER: [u8; 5] = [0x00, 0x20, 0x6B, 0x7F, 0x42];

pub const GET: u8 = 0x01;
pub const SET: u8 = 0x02;

pub const PARAM_PAD_MODE: u8 = 0x01;
pub const PARAM_PAD_CONTROL: u8 = 0x03;
pub const PARAM_ENCODER_MIN: u8 = 0x04;
pub const PARAM_ENCODER_MAX: u8 = 0x05;
pub const PARAM_PAD_COLOR: u8 = 0x10;
pub const PARAM_GLOBAL: u8 = 0x40;

/// Global parameter id of the MIDI channel.
pub const GLOBAL_CHANNEL: u8 = 0x06;

/// Pad mode value for switch (toggle) mode.
pub const PAD_MODE_SWITCH: u8 = 0x08;

fn message(command: u8, parameter: u8, id: u8, value: Option<u8>) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(12);
    bytes.push(SYSEX_START);
    bytes.extend_from_slice(&HEADER);
    bytes.extend_from_slice(&[command, 0x00, parameter, id]);
    bytes.extend(value);
    bytes.push(SYSEX_END);
    bytes
}

/// Set parameter `parameter` of element `id` to `value`.
pub fn set(parameter: u8, id: u8, value: u8) -> Vec<u8> {
    message(SET, parameter, id, Some(value & 0x7F))
}

pub fn get(parameter: u8, id: u8) -> Vec<u8> {
    message(GET, parameter, id, None)
}

/// Prefix of the device's reply to `get(parameter, id)`; the value follows.
pub fn reply_pattern(parameter: u8, id: u8) -> SysexPattern {
    SysexPattern::new(message(SET, parameter, id, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_encoder_min() {
        assert_eq!(
            set(PARAM_ENCODER_MIN, 0x20, 64),
            vec![0xF0, 0x00, 0x20, 0x6B, 0x7F, 0x42, 0x02, 0x00, 0x04, 0x20, 0x40, 0xF7]
        );
    }

    #[test]
    fn test_channel_request_and_reply() {
        assert_eq!(
            get(PARAM_GLOBAL, GLOBAL_CHANNEL),
            vec![0xF0, 0x00, 0x20, 0x6B, 0x7F, 0x42, 0x01, 0x00, 0x40, 0x06, 0xF7]
        );

        let reply = [0xF0, 0x00, 0x20, 0x6B, 0x7F, 0x42, 0x02, 0x00, 0x40, 0x06, 0x03, 0xF7];
        assert_eq!(
            reply_pattern(PARAM_GLOBAL, GLOBAL_CHANNEL).matches(&reply),
            Some(vec![0x03])
        );
    }
}
