//! Static encoder / control / pad index.
//!
//! Every physical encoder reports exactly one CC number and owns exactly one
//! indicator pad. The pad id is the encoder id plus a fixed offset. The table is
//! built once and checked for duplicates on construction.

use std::collections::HashMap;

use crate::error::LayoutError;

/// A logical CC number (0-127).
pub type Control = u8;

/// Physical rotary encoder identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Encoder(pub u8);

/// LED indicator pad identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pad(pub u8);

#[derive(Debug, Clone, Copy)]
struct Slot {
    encoder: Encoder,
    control: Control,
    pad: Pad,
}

/// Bidirectional lookup between encoders, controls and pads.
#[derive(Debug, Clone)]
pub struct SurfaceLayout {
    slots: Vec<Slot>,
    by_encoder: HashMap<Encoder, usize>,
    by_control: HashMap<Control, usize>,
}

impl SurfaceLayout {
    /// Build a layout from `(encoder, control)` pairs, deriving each pad as
    /// `encoder + pad_offset`.
    pub fn new(pairs: &[(u8, Control)], pad_offset: u8) -> Result<Self, LayoutError> {
        let mut slots = Vec::with_capacity(pairs.len());
        let mut by_encoder = HashMap::new();
        let mut by_control = HashMap::new();

        for &(encoder, control) in pairs {
            if control > 127 {
                return Err(LayoutError::ControlOutOfRange(control));
            }
            let pad = encoder
                .checked_add(pad_offset)
                .filter(|pad| *pad <= 127)
                .ok_or(LayoutError::PadOutOfRange { encoder, pad_offset })?;

            let index = slots.len();
            if by_encoder.insert(Encoder(encoder), index).is_some() {
                return Err(LayoutError::DuplicateEncoder(encoder));
            }
            if by_control.insert(control, index).is_some() {
                return Err(LayoutError::DuplicateControl(control));
            }

            slots.push(Slot {
                encoder: Encoder(encoder),
                control,
                pad: Pad(pad),
            });
        }

        Ok(Self {
            slots,
            by_encoder,
            by_control,
        })
    }

    /// Encoders in table order.
    pub fn encoders(&self) -> impl Iterator<Item = Encoder> + '_ {
        self.slots.iter().map(|slot| slot.encoder)
    }

    pub fn control_for(&self, encoder: Encoder) -> Option<Control> {
        self.by_encoder
            .get(&encoder)
            .map(|&index| self.slots[index].control)
    }

    pub fn encoder_for(&self, control: Control) -> Option<Encoder> {
        self.by_control
            .get(&control)
            .map(|&index| self.slots[index].encoder)
    }

    pub fn pad_for(&self, encoder: Encoder) -> Option<Pad> {
        self.by_encoder
            .get(&encoder)
            .map(|&index| self.slots[index].pad)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
