//! Arturia BeatStep mapping.
//!
//! ```text
//! Encoders (top two rows, left to right)      Pads (encoder + 0x50)
//! 0x20 0x21 0x22 .... 0x24 0x25 0x26 ....     0x70 0x71 0x72 .... 0x74 ...
//! 0x28 0x29 0x2A .... 0x2C 0x2D 0x2E ....     0x78 0x79 0x7A .... 0x7C ...
//!
//! Transport buttons
//! Stop 0x58  Start 0x59  Cntrl/Seq 0x5A  Ext-Sync 0x5B
//! Recall 0x5C  Store 0x5D  Shift 0x5E  Chan 0x5F
//! ```
//!
//! The fourth encoder of each group is left alone.

use ccpatch_core::{Action, Control, Encoder, Pad};

/// BeatStep constants and lookup tables.
pub struct BeatStepMapping;

impl BeatStepMapping {
    // === Pad colors ===
    pub const OFF: u8 = 0x00;
    pub const BLUE: u8 = 0x10;
    pub const MAGENTA: u8 = 0x11;

    // === Transport buttons ===
    pub const EXT_SYNC: u8 = 0x5B;
    pub const RECALL: u8 = 0x5C;
    pub const STORE: u8 = 0x5D;
    pub const SHIFT: u8 = 0x5E;
    pub const CHAN: u8 = 0x5F;

    /// Pad id of an encoder's indicator pad is the encoder id plus this.
    pub const PAD_OFFSET: u8 = 0x50;

    /// First pad of the row used as the channel indicator.
    pub const CHANNEL_INDICATOR_BASE: u8 = 0x70;

    /// Encoder id to the CC number it sends.
    pub const ENCODERS: [(u8, Control); 12] = [
        (0x20, 0x0C),
        (0x21, 0x0D),
        (0x22, 0x0E),
        (0x24, 0x0F),
        (0x25, 0x10),
        (0x26, 0x11),
        (0x28, 0x12),
        (0x29, 0x13),
        (0x2A, 0x14),
        (0x2C, 0x15),
        (0x2D, 0x16),
        (0x2E, 0x17),
    ];

    /// First and last CC set aside for function pads.
    pub const RESERVED_FIRST: Control = 0x34;
    pub const RESERVED_LAST: Control = 0x40;

    /// Transport buttons used as function pads, in binding order.
    pub const FUNCTION_PADS: [(u8, Action); 5] = [
        (Self::EXT_SYNC, Action::ResetToDefaults),
        (Self::STORE, Action::ToggleFreeze),
        (Self::SHIFT, Action::DecrementChannel),
        (Self::CHAN, Action::IncrementChannel),
        (Self::RECALL, Action::RecallChannel),
    ];

    pub fn function_pads() -> Vec<(Pad, Action)> {
        Self::FUNCTION_PADS
            .iter()
            .map(|&(pad, action)| (Pad(pad), action))
            .collect()
    }

    /// Reset value for an encoder. Columns within each group of four go
    /// mid-scale, full, zero, zero.
    pub fn default_value(encoder: Encoder) -> Option<u8> {
        if !(0x20..=0x2F).contains(&encoder.0) {
            return None;
        }
        Some(match encoder.0 % 4 {
            0 => 64,
            1 => 127,
            _ => 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values_by_column() {
        assert_eq!(BeatStepMapping::default_value(Encoder(0x20)), Some(64));
        assert_eq!(BeatStepMapping::default_value(Encoder(0x25)), Some(127));
        assert_eq!(BeatStepMapping::default_value(Encoder(0x2A)), Some(0));
        assert_eq!(BeatStepMapping::default_value(Encoder(0x2F)), Some(0));
        assert_eq!(BeatStepMapping::default_value(Encoder(0x30)), None);
    }

    #[test]
    fn test_function_pads_are_transport_buttons() {
        for (pad, _) in BeatStepMapping::function_pads() {
            assert!((BeatStepMapping::EXT_SYNC..=BeatStepMapping::CHAN).contains(&pad.0));
        }
        let reserved = BeatStepMapping::RESERVED_FIRST..=BeatStepMapping::RESERVED_LAST;
        assert!(BeatStepMapping::FUNCTION_PADS.len() <= reserved.count());
    }
}
