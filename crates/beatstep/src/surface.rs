use std::ops::RangeInclusive;

use ccpatch_core::{
    Action, Channel, Control, ControlSurface, Encoder, LayoutError, Pad, PadColor, SurfaceLayout,
    SysexPattern,
};

use crate::midi::mapping::BeatStepMapping;
use crate::midi::sysex;

/// The Arturia BeatStep as a [`ControlSurface`].
pub struct BeatStep {
    layout: SurfaceLayout,
}

impl BeatStep {
    pub fn new() -> Result<Self, LayoutError> {
        Ok(Self {
            layout: SurfaceLayout::new(&BeatStepMapping::ENCODERS, BeatStepMapping::PAD_OFFSET)?,
        })
    }

    fn color_value(color: PadColor) -> u8 {
        match color {
            PadColor::Off => BeatStepMapping::OFF,
            PadColor::Awaiting => BeatStepMapping::MAGENTA,
            PadColor::Locked => BeatStepMapping::BLUE,
        }
    }
}

impl ControlSurface for BeatStep {
    fn layout(&self) -> &SurfaceLayout {
        &self.layout
    }

    fn reserved_controls(&self) -> RangeInclusive<Control> {
        BeatStepMapping::RESERVED_FIRST..=BeatStepMapping::RESERVED_LAST
    }

    fn function_pads(&self) -> Vec<(Pad, Action)> {
        BeatStepMapping::function_pads()
    }

    fn default_value(&self, encoder: Encoder) -> Option<u8> {
        BeatStepMapping::default_value(encoder)
    }

    fn encoder_range(&self, encoder: Encoder, min: u8, max: u8) -> Vec<Vec<u8>> {
        vec![
            sysex::set(sysex::PARAM_ENCODER_MIN, encoder.0, min),
            sysex::set(sysex::PARAM_ENCODER_MAX, encoder.0, max),
        ]
    }

    fn pad_color(&self, pad: Pad, color: PadColor) -> Vec<u8> {
        sysex::set(sysex::PARAM_PAD_COLOR, pad.0, Self::color_value(color))
    }

    fn pad_switch_mode(&self, pad: Pad) -> Vec<u8> {
        sysex::set(sysex::PARAM_PAD_MODE, pad.0, sysex::PAD_MODE_SWITCH)
    }

    fn assign_pad_control(&self, pad: Pad, control: Control) -> Vec<u8> {
        sysex::set(sysex::PARAM_PAD_CONTROL, pad.0, control)
    }

    fn request_channel(&self) -> Vec<u8> {
        sysex::get(sysex::PARAM_GLOBAL, sysex::GLOBAL_CHANNEL)
    }

    fn channel_report_pattern(&self) -> SysexPattern {
        sysex::reply_pattern(sysex::PARAM_GLOBAL, sysex::GLOBAL_CHANNEL)
    }

    fn select_channel(&self, channel: Channel) -> Vec<u8> {
        sysex::set(sysex::PARAM_GLOBAL, sysex::GLOBAL_CHANNEL, channel.get())
    }

    fn channel_indicator(&self, channel: Channel) -> Vec<u8> {
        sysex::set(
            sysex::PARAM_PAD_COLOR,
            BeatStepMapping::CHANNEL_INDICATOR_BASE + channel.get(),
            BeatStepMapping::MAGENTA,
        )
    }
}
