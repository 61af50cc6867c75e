//! The device seam.
//!
//! The engine only knows about encoders, pads and channels. A `ControlSurface`
//! turns those into the bytes a particular controller understands.

use std::ops::RangeInclusive;

use crate::channel::Channel;
use crate::engine::Action;
use crate::layout::{Control, Encoder, Pad, SurfaceLayout};
use crate::matcher::SysexPattern;

/// Pad colors the engine asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadColor {
    Off,
    /// Encoder is waiting for the operator to reach its stored value.
    Awaiting,
    /// Encoder holds a stored value and the surface is frozen.
    Locked,
}

pub trait ControlSurface {
    fn layout(&self) -> &SurfaceLayout;

    /// CC numbers set aside for function pads. Never stored in a patch.
    fn reserved_controls(&self) -> RangeInclusive<Control>;

    /// Function pads and the action each triggers, in binding order. The n-th
    /// pad is bound to the n-th reserved control.
    fn function_pads(&self) -> Vec<(Pad, Action)>;

    /// Value an encoder takes when the patch is reset.
    fn default_value(&self, encoder: Encoder) -> Option<u8>;

    /// Messages limiting an encoder's reported range to `min..=max`.
    fn encoder_range(&self, encoder: Encoder, min: u8, max: u8) -> Vec<Vec<u8>>;

    fn pad_color(&self, pad: Pad, color: PadColor) -> Vec<u8>;

    /// Put a pad in switch mode so it sends a CC on press.
    fn pad_switch_mode(&self, pad: Pad) -> Vec<u8>;

    fn assign_pad_control(&self, pad: Pad, control: Control) -> Vec<u8>;

    /// Ask the device which global channel it is on.
    fn request_channel(&self) -> Vec<u8>;

    /// Pattern of the device's reply to [`ControlSurface::request_channel`].
    /// The channel is the first payload byte.
    fn channel_report_pattern(&self) -> SysexPattern;

    fn select_channel(&self, channel: Channel) -> Vec<u8>;

    fn channel_indicator(&self, channel: Channel) -> Vec<u8>;
}
