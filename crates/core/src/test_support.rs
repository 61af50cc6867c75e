//! A tiny surface with readable byte encodings for unit tests.

use std::ops::RangeInclusive;

use crate::channel::Channel;
use crate::engine::Action;
use crate::layout::{Control, Encoder, Pad, SurfaceLayout};
use crate::matcher::SysexPattern;
use crate::surface::{ControlSurface, PadColor};

/// Three encoders, 0x20..=0x22, on controls 20..=22, pads 0x70..=0x72.
pub(crate) struct TestSurface {
    layout: SurfaceLayout,
}

impl TestSurface {
    pub(crate) fn new() -> Self {
        Self {
            layout: SurfaceLayout::new(&[(0x20, 20), (0x21, 21), (0x22, 22)], 0x50).unwrap(),
        }
    }
}

pub(crate) fn color_code(color: PadColor) -> u8 {
    match color {
        PadColor::Off => 0,
        PadColor::Awaiting => 1,
        PadColor::Locked => 2,
    }
}

impl ControlSurface for TestSurface {
    fn layout(&self) -> &SurfaceLayout {
        &self.layout
    }

    fn reserved_controls(&self) -> RangeInclusive<Control> {
        0x34..=0x40
    }

    fn function_pads(&self) -> Vec<(Pad, Action)> {
        vec![
            (Pad(0x5B), Action::ResetToDefaults),
            (Pad(0x5D), Action::ToggleFreeze),
            (Pad(0x5E), Action::DecrementChannel),
            (Pad(0x5F), Action::IncrementChannel),
            (Pad(0x5C), Action::RecallChannel),
        ]
    }

    fn default_value(&self, encoder: Encoder) -> Option<u8> {
        match encoder.0 {
            0x20 => Some(64),
            0x21 => Some(127),
            0x22 => Some(0),
            _ => None,
        }
    }

    fn encoder_range(&self, encoder: Encoder, min: u8, max: u8) -> Vec<Vec<u8>> {
        vec![vec![0x04, encoder.0, min], vec![0x05, encoder.0, max]]
    }

    fn pad_color(&self, pad: Pad, color: PadColor) -> Vec<u8> {
        vec![0x10, pad.0, color_code(color)]
    }

    fn pad_switch_mode(&self, pad: Pad) -> Vec<u8> {
        vec![0x01, pad.0, 0x08]
    }

    fn assign_pad_control(&self, pad: Pad, control: Control) -> Vec<u8> {
        vec![0x03, pad.0, control]
    }

    fn request_channel(&self) -> Vec<u8> {
        vec![0xF0, 0x01, 0x40, 0xF7]
    }

    fn channel_report_pattern(&self) -> SysexPattern {
        SysexPattern::new(vec![0xF0, 0x02, 0x40, 0xF7])
    }

    fn select_channel(&self, channel: Channel) -> Vec<u8> {
        vec![0x40, 0x06, channel.get()]
    }

    fn channel_indicator(&self, channel: Channel) -> Vec<u8> {
        vec![0x10, 0x70 + channel.get(), 0x11]
    }
}
