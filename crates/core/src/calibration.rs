//! Encoder calibration.
//!
//! Encoders report absolute positions but cannot be moved by software. To bring
//! a knob back to a stored value the engine clamps its reporting range around
//! the target, waits until the device reports exactly the target, then releases
//! the clamp.
//!
//! ```text
//!             lock (stored values)             last pending confirmed
//!  UNLOCKED ───────────────────────▶ LOCKED ───────────────────────────▶ UNLOCKED
//!     ▲                                 │      (automatic policy)
//!     └──────── release (toggle) ───────┘
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::layout::{Control, Encoder};
use crate::leds::LedState;
use crate::messages::Outgoing;
use crate::patch::Patch;
use crate::surface::{ControlSurface, PadColor};

/// Full encoder range, restored on release.
pub const FULL_RANGE: (u8, u8) = (0, 127);

/// Reporting window used to freeze an encoder at `value`.
///
/// The firmware rejects a degenerate `[v, v]` window, so the window is widened
/// by one step, downwards at the top of the range.
pub fn freeze_range(value: u8) -> (u8, u8) {
    let value = value.min(127);
    if value < 127 {
        (value, value + 1)
    } else {
        (value - 1, value)
    }
}

/// When a locked surface goes back to live capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlockPolicy {
    /// Release as soon as every pending encoder is confirmed.
    #[default]
    Automatic,
    /// Stay frozen until the freeze toggle is pressed.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// Incoming values are written straight to the patch.
    Unlocked,
    /// Encoders are frozen; incoming values only confirm pending encoders.
    Locked,
}

/// Outcome of feeding one CC value through the calibration gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Stored in the patch.
    Captured,
    /// Encoder reached its target and left the pending set.
    Confirmed(Encoder),
    /// Encoder reached its target, it was the last one, and the surface was
    /// released.
    Released(Encoder),
    /// Pending encoder reported something other than its target.
    Mismatch { encoder: Encoder, expected: u8 },
    /// Surface is locked and the control is not pending.
    Held,
}

#[derive(Debug, Clone)]
pub struct Calibration {
    pending: BTreeSet<Encoder>,
    frozen: bool,
    policy: UnlockPolicy,
}

impl Calibration {
    pub fn new(policy: UnlockPolicy) -> Self {
        Self {
            pending: BTreeSet::new(),
            frozen: false,
            policy,
        }
    }

    pub fn state(&self) -> CalibrationState {
        if self.frozen || !self.pending.is_empty() {
            CalibrationState::Locked
        } else {
            CalibrationState::Unlocked
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_pending(&self, encoder: Encoder) -> bool {
        self.pending.contains(&encoder)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Freeze every encoder that has a stored value on `channel` and wait for
    /// each one to be confirmed. Returns the number of pending encoders.
    pub fn lock<S: ControlSurface>(
        &mut self,
        channel: Channel,
        patch: &Patch,
        surface: &S,
        leds: &mut LedState,
        out: &mut Vec<Outgoing>,
    ) -> usize {
        self.pending.clear();
        let layout = surface.layout();

        for (control, value) in patch.channel_values(channel) {
            let Some(encoder) = layout.encoder_for(control) else {
                continue;
            };
            let (min, max) = freeze_range(value);
            out.extend(
                surface
                    .encoder_range(encoder, min, max)
                    .into_iter()
                    .map(Outgoing::ControllerSysex),
            );
            if let Some(pad) = layout.pad_for(encoder) {
                leds.set_pad_color(pad, PadColor::Awaiting);
            }
            self.pending.insert(encoder);
        }

        if !self.pending.is_empty() {
            self.frozen = true;
            log::info!(
                "Locked channel {}: {} encoder(s) awaiting calibration",
                channel,
                self.pending.len()
            );
        }
        self.pending.len()
    }

    /// Restore every encoder to its full range and forget pending encoders.
    pub fn release<S: ControlSurface>(
        &mut self,
        surface: &S,
        leds: &mut LedState,
        out: &mut Vec<Outgoing>,
    ) {
        let layout = surface.layout();
        let (min, max) = FULL_RANGE;
        for encoder in layout.encoders() {
            out.extend(
                surface
                    .encoder_range(encoder, min, max)
                    .into_iter()
                    .map(Outgoing::ControllerSysex),
            );
            if let Some(pad) = layout.pad_for(encoder) {
                leds.set_pad_color(pad, PadColor::Off);
            }
        }
        self.pending.clear();
        self.frozen = false;
        log::info!("Released all encoders");
    }

    /// Feed a CC value for the active channel through the calibration gate.
    /// Reserved controls and other channels must be filtered out by the caller.
    #[allow(clippy::too_many_arguments)]
    pub fn observe<S: ControlSurface>(
        &mut self,
        channel: Channel,
        control: Control,
        value: u8,
        patch: &mut Patch,
        surface: &S,
        leds: &mut LedState,
        out: &mut Vec<Outgoing>,
    ) -> Observation {
        if self.state() == CalibrationState::Unlocked {
            patch.set(channel, control, value);
            return Observation::Captured;
        }

        let layout = surface.layout();
        let Some(encoder) = layout
            .encoder_for(control)
            .filter(|encoder| self.pending.contains(encoder))
        else {
            return Observation::Held;
        };

        let expected = patch.get(channel, control);
        if value != expected {
            return Observation::Mismatch { encoder, expected };
        }

        self.pending.remove(&encoder);
        if let Some(pad) = layout.pad_for(encoder) {
            leds.set_pad_color(pad, PadColor::Off);
        }
        log::debug!("Encoder {:#04x} calibrated at {}", encoder.0, value);

        if self.pending.is_empty() && self.policy == UnlockPolicy::Automatic {
            self.release(surface, leds, out);
            return Observation::Released(encoder);
        }
        Observation::Confirmed(encoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestSurface;

    fn ch(n: u8) -> Channel {
        Channel::new(n).unwrap()
    }

    fn locked(policy: UnlockPolicy, values: &[(Control, u8)]) -> (Calibration, Patch, LedState) {
        let surface = TestSurface::new();
        let mut patch = Patch::new();
        for &(control, value) in values {
            patch.set(ch(2), control, value);
        }
        let mut calibration = Calibration::new(policy);
        let mut leds = LedState::new();
        calibration.lock(ch(2), &patch, &surface, &mut leds, &mut Vec::new());
        (calibration, patch, leds)
    }

    #[test]
    fn test_freeze_range_boundaries() {
        assert_eq!(freeze_range(64), (64, 65));
        assert_eq!(freeze_range(0), (0, 1));
        assert_eq!(freeze_range(126), (126, 127));
        assert_eq!(freeze_range(127), (126, 127));
    }

    #[test]
    fn test_lock_queues_stored_encoders() {
        let surface = TestSurface::new();
        let mut patch = Patch::new();
        patch.set(ch(2), 20, 64);
        // Not on any encoder: stored, but never pending.
        patch.set(ch(2), 99, 1);

        let mut calibration = Calibration::new(UnlockPolicy::Automatic);
        let mut leds = LedState::new();
        let mut out = Vec::new();
        let pending = calibration.lock(ch(2), &patch, &surface, &mut leds, &mut out);

        assert_eq!(pending, 1);
        assert!(calibration.is_pending(Encoder(0x20)));
        assert_eq!(calibration.state(), CalibrationState::Locked);
        assert_eq!(
            out,
            vec![
                Outgoing::ControllerSysex(vec![0x04, 0x20, 64]),
                Outgoing::ControllerSysex(vec![0x05, 0x20, 65]),
            ]
        );
        assert_eq!(leds.color(crate::layout::Pad(0x70)), PadColor::Awaiting);
    }

    #[test]
    fn test_lock_empty_channel_stays_unlocked() {
        let (calibration, _, _) = locked(UnlockPolicy::Automatic, &[]);
        assert_eq!(calibration.state(), CalibrationState::Unlocked);
        assert!(!calibration.is_frozen());
    }

    #[test]
    fn test_confirmation_gate() {
        let surface = TestSurface::new();
        let (mut calibration, mut patch, mut leds) =
            locked(UnlockPolicy::Manual, &[(20, 90), (21, 5)]);
        let mut out = Vec::new();

        let near = calibration.observe(ch(2), 20, 89, &mut patch, &surface, &mut leds, &mut out);
        assert_eq!(
            near,
            Observation::Mismatch {
                encoder: Encoder(0x20),
                expected: 90
            }
        );
        assert!(calibration.is_pending(Encoder(0x20)));
        assert_eq!(patch.get(ch(2), 20), 90);

        let hit = calibration.observe(ch(2), 20, 90, &mut patch, &surface, &mut leds, &mut out);
        assert_eq!(hit, Observation::Confirmed(Encoder(0x20)));
        assert!(!calibration.is_pending(Encoder(0x20)));
        assert_eq!(leds.color(crate::layout::Pad(0x70)), PadColor::Off);
    }

    #[test]
    fn test_locked_surface_holds_other_controls() {
        let surface = TestSurface::new();
        let (mut calibration, mut patch, mut leds) = locked(UnlockPolicy::Automatic, &[(20, 90)]);

        let outcome = calibration.observe(ch(2), 22, 3, &mut patch, &surface, &mut leds, &mut Vec::new());
        assert_eq!(outcome, Observation::Held);
        assert!(!patch.has(ch(2), 22));
    }

    #[test]
    fn test_automatic_policy_releases_after_last_confirmation() {
        let surface = TestSurface::new();
        let (mut calibration, mut patch, mut leds) = locked(UnlockPolicy::Automatic, &[(20, 127)]);
        let mut out = Vec::new();

        let outcome = calibration.observe(ch(2), 20, 127, &mut patch, &surface, &mut leds, &mut out);
        assert_eq!(outcome, Observation::Released(Encoder(0x20)));
        assert_eq!(calibration.state(), CalibrationState::Unlocked);
        // Every encoder goes back to 0..=127.
        assert_eq!(out.len(), surface.layout().len() * 2);
        assert!(out.contains(&Outgoing::ControllerSysex(vec![0x04, 0x22, 0])));
        assert!(out.contains(&Outgoing::ControllerSysex(vec![0x05, 0x22, 127])));

        let captured = calibration.observe(ch(2), 20, 3, &mut patch, &surface, &mut leds, &mut out);
        assert_eq!(captured, Observation::Captured);
        assert_eq!(patch.get(ch(2), 20), 3);
    }

    #[test]
    fn test_manual_policy_stays_locked_until_release() {
        let surface = TestSurface::new();
        let (mut calibration, mut patch, mut leds) = locked(UnlockPolicy::Manual, &[(20, 10)]);
        let mut out = Vec::new();

        calibration.observe(ch(2), 20, 10, &mut patch, &surface, &mut leds, &mut out);
        assert_eq!(calibration.pending_len(), 0);
        assert_eq!(calibration.state(), CalibrationState::Locked);
        assert!(out.is_empty());

        let outcome = calibration.observe(ch(2), 20, 11, &mut patch, &surface, &mut leds, &mut out);
        assert_eq!(outcome, Observation::Held);
        assert_eq!(patch.get(ch(2), 20), 10);

        calibration.release(&surface, &mut leds, &mut out);
        assert_eq!(calibration.state(), CalibrationState::Unlocked);
    }
}
