//! Pad LED state.
//!
//! Tracks the color last sent to each indicator pad and produces sysex for the
//! pads that changed. The projection recomputes every encoder pad from engine
//! state and forces a full resend, since the device repaints pads on its own
//! when they are pressed.

use std::collections::{BTreeMap, BTreeSet};

use crate::calibration::Calibration;
use crate::channel::Channel;
use crate::layout::{Encoder, Pad};
use crate::patch::Patch;
use crate::surface::{ControlSurface, PadColor};

#[derive(Debug, Clone, Default)]
pub struct LedState {
    pads: BTreeMap<Pad, PadColor>,
    dirty: BTreeSet<Pad>,
}

impl LedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&self, pad: Pad) -> PadColor {
        self.pads.get(&pad).copied().unwrap_or(PadColor::Off)
    }

    pub fn set_pad_color(&mut self, pad: Pad, color: PadColor) {
        if self.color(pad) != color || !self.pads.contains_key(&pad) {
            self.pads.insert(pad, color);
            self.dirty.insert(pad);
        }
    }

    /// Recompute every encoder pad from a snapshot of engine state and mark
    /// all of them for resend.
    pub fn project<S: ControlSurface>(
        &mut self,
        surface: &S,
        patch: &Patch,
        calibration: &Calibration,
        channel: Channel,
    ) {
        let layout = surface.layout();
        for encoder in layout.encoders() {
            let Some(pad) = layout.pad_for(encoder) else {
                continue;
            };
            let color = projected_color(surface, patch, calibration, channel, encoder);
            self.pads.insert(pad, color);
            self.dirty.insert(pad);
        }
    }

    /// Turn every known pad off.
    pub fn clear(&mut self) {
        let pads: Vec<Pad> = self.pads.keys().copied().collect();
        for pad in pads {
            self.set_pad_color(pad, PadColor::Off);
        }
    }

    /// Sysex for pads changed since the last call.
    pub fn to_sysex<S: ControlSurface>(&mut self, surface: &S) -> Vec<Vec<u8>> {
        let dirty = std::mem::take(&mut self.dirty);
        dirty
            .into_iter()
            .map(|pad| surface.pad_color(pad, self.color(pad)))
            .collect()
    }

}

/// Color an encoder's pad should show right now.
pub fn projected_color<S: ControlSurface>(
    surface: &S,
    patch: &Patch,
    calibration: &Calibration,
    channel: Channel,
    encoder: Encoder,
) -> PadColor {
    if calibration.is_pending(encoder) {
        return PadColor::Awaiting;
    }
    let stored = surface
        .layout()
        .control_for(encoder)
        .is_some_and(|control| patch.has(channel, control));
    if stored && calibration.is_frozen() {
        PadColor::Locked
    } else {
        PadColor::Off
    }
}
