//! The patch engine.
//!
//! One `Engine` owns every piece of mutable state: the patch, the pending set,
//! the freeze flag, the active channel and the pad LEDs. Each call takes a
//! message or command and returns the side effects for the runtime to carry
//! out, so a caller that serializes calls gets atomic message handling.

use crate::calibration::{Calibration, CalibrationState, Observation, UnlockPolicy};
use crate::channel::{Channel, ChannelBoundary, ChannelController, Direction};
use crate::config::Settings;
use crate::layout::Control;
use crate::leds::LedState;
use crate::listeners::{ListenerRegistry, Trigger};
use crate::matcher::SysexPattern;
use crate::messages::{MidiMessage, Outgoing, MMC_STOP};
use crate::patch::Patch;
use crate::surface::ControlSurface;

/// Things a listener can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Adopt the channel in a device channel report.
    SyncChannel,
    SavePatch,
    ToggleFreeze,
    IncrementChannel,
    DecrementChannel,
    /// Seed every channel with the surface's default values.
    ResetToDefaults,
    /// Send the active channel's stored values to the instrument.
    RecallChannel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub unlock_policy: UnlockPolicy,
    pub channel_boundary: ChannelBoundary,
}

impl From<&Settings> for EngineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            unlock_policy: settings.unlock_policy,
            channel_boundary: settings.channel_boundary,
        }
    }
}

pub struct Engine<S> {
    surface: S,
    patch: Patch,
    calibration: Calibration,
    channels: ChannelController,
    listeners: ListenerRegistry<Action>,
    leds: LedState,
}

impl<S: ControlSurface> Engine<S> {
    pub fn new(surface: S, config: EngineConfig) -> Self {
        let mut listeners = ListenerRegistry::new();
        listeners.on_sysex(surface.channel_report_pattern(), Action::SyncChannel);
        listeners.on_sysex(SysexPattern::new(MMC_STOP.to_vec()), Action::SavePatch);

        let pads = surface.function_pads();
        let reserved = surface.reserved_controls();
        if pads.len() > reserved.clone().count() {
            log::warn!(
                "{} function pads but only {} reserved controls; extra pads are unbound",
                pads.len(),
                reserved.clone().count()
            );
        }
        for (control, (_, action)) in reserved.zip(pads) {
            listeners.on_control(control, action);
        }

        Self {
            surface,
            patch: Patch::new(),
            calibration: Calibration::new(config.unlock_policy),
            channels: ChannelController::new(config.channel_boundary),
            listeners,
            leds: LedState::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn leds(&self) -> &LedState {
        &self.leds
    }

    pub fn active_channel(&self) -> Channel {
        self.channels.active()
    }

    pub fn state(&self) -> CalibrationState {
        self.calibration.state()
    }

    pub fn is_reserved(&self, control: Control) -> bool {
        self.surface.reserved_controls().contains(&control)
    }

    /// Messages that bind the function pads and ask the device for its
    /// current channel.
    pub fn startup(&mut self) -> Vec<Outgoing> {
        let mut out = Vec::new();
        let reserved = self.surface.reserved_controls();
        for (control, (pad, action)) in reserved.zip(self.surface.function_pads()) {
            out.push(Outgoing::ControllerSysex(self.surface.pad_switch_mode(pad)));
            out.push(Outgoing::ControllerSysex(
                self.surface.assign_pad_control(pad, control),
            ));
            log::debug!("Pad {:#04x} bound to CC {:#04x} ({:?})", pad.0, control, action);
        }
        out.push(Outgoing::ControllerSysex(self.surface.request_channel()));
        out
    }

    /// Handle one inbound message.
    pub fn handle(&mut self, message: &MidiMessage) -> Vec<Outgoing> {
        let mut out = Vec::new();

        if let MidiMessage::ControlChange { channel, .. } = *message {
            if channel != self.channels.active() {
                log::trace!("Ignoring CC on inactive channel {}", channel);
                return out;
            }
        }

        for (action, trigger) in self.listeners.dispatch(message) {
            self.perform(action, &trigger, &mut out);
        }

        if let MidiMessage::ControlChange {
            channel,
            control,
            value,
        } = *message
        {
            self.ingest(channel, control, value, &mut out);
        }

        self.flush_leds(&mut out);
        out
    }

    /// Run an action as if its listener had fired.
    pub fn perform(&mut self, action: Action, trigger: &Trigger, out: &mut Vec<Outgoing>) {
        match action {
            Action::SyncChannel => self.sync_channel(trigger, out),
            Action::SavePatch => {
                log::info!("Save requested ({} stored values)", self.patch.len());
                out.push(Outgoing::SavePatch(self.patch.clone()));
            }
            Action::ToggleFreeze => self.toggle_freeze_into(out),
            Action::IncrementChannel => self.switch_channel(Direction::Up, out),
            Action::DecrementChannel => self.switch_channel(Direction::Down, out),
            Action::ResetToDefaults => self.reset_to_defaults_into(out),
            Action::RecallChannel => self.recall_into(out),
        }
    }

    pub fn increment_channel(&mut self) -> Vec<Outgoing> {
        self.with_leds(|engine, out| engine.switch_channel(Direction::Up, out))
    }

    pub fn decrement_channel(&mut self) -> Vec<Outgoing> {
        self.with_leds(|engine, out| engine.switch_channel(Direction::Down, out))
    }

    pub fn toggle_freeze(&mut self) -> Vec<Outgoing> {
        self.with_leds(Self::toggle_freeze_into)
    }

    pub fn reset_to_defaults(&mut self) -> Vec<Outgoing> {
        self.with_leds(Self::reset_to_defaults_into)
    }

    /// Replace the whole patch, lock the active channel against it and send
    /// its values to the instrument.
    pub fn load_patch(&mut self, patch: Patch) -> Vec<Outgoing> {
        self.with_leds(|engine, out| {
            engine.release_if_locked(out);
            engine.patch = patch;
            log::info!("Loaded patch with {} stored values", engine.patch.len());
            engine.lock_active(out);
            engine.recall_into(out);
        })
    }

    /// Recompute every encoder pad from current state.
    pub fn refresh_leds(&mut self) -> Vec<Outgoing> {
        let channel = self.channels.active();
        self.leds
            .project(&self.surface, &self.patch, &self.calibration, channel);
        let mut out = Vec::new();
        self.flush_leds(&mut out);
        out
    }

    /// Leave the hardware unclamped and dark.
    pub fn shutdown(&mut self) -> Vec<Outgoing> {
        self.with_leds(|engine, out| {
            engine.release_if_locked(out);
            engine.leds.clear();
        })
    }

    fn with_leds(&mut self, f: impl FnOnce(&mut Self, &mut Vec<Outgoing>)) -> Vec<Outgoing> {
        let mut out = Vec::new();
        f(self, &mut out);
        self.flush_leds(&mut out);
        out
    }

    fn flush_leds(&mut self, out: &mut Vec<Outgoing>) {
        out.extend(
            self.leds
                .to_sysex(&self.surface)
                .into_iter()
                .map(Outgoing::ControllerSysex),
        );
    }

    fn ingest(&mut self, channel: Channel, control: Control, value: u8, out: &mut Vec<Outgoing>) {
        if self.is_reserved(control) {
            return;
        }

        let outcome = self.calibration.observe(
            channel,
            control,
            value,
            &mut self.patch,
            &self.surface,
            &mut self.leds,
            out,
        );
        match outcome {
            Observation::Captured => {
                log::debug!("Channel {} CC {} = {}", channel, control, value)
            }
            Observation::Confirmed(encoder) => log::info!(
                "Encoder {:#04x} calibrated, {} still pending",
                encoder.0,
                self.calibration.pending_len()
            ),
            Observation::Released(encoder) => log::info!(
                "Encoder {:#04x} calibrated, channel {} unlocked",
                encoder.0,
                channel
            ),
            Observation::Mismatch { .. } | Observation::Held => {}
        }
    }

    fn sync_channel(&mut self, trigger: &Trigger, out: &mut Vec<Outgoing>) {
        let Trigger::Payload(payload) = trigger else {
            log::warn!("Channel report without payload");
            return;
        };
        let previous = self.channels.active();
        match self.channels.sync_from_report(payload) {
            Some(channel) => {
                log::info!("Device is on channel {}", channel);
                if channel == previous {
                    return;
                }
                // The pending set always belongs to the active channel.
                self.release_if_locked(out);
                if self.patch.channel_has_any(channel) {
                    self.lock_active(out);
                    self.recall_into(out);
                }
            }
            None => log::warn!("Ignoring invalid channel report {:02X?}", payload),
        }
    }

    fn switch_channel(&mut self, direction: Direction, out: &mut Vec<Outgoing>) {
        self.release_if_locked(out);
        let channel = self.channels.step(direction);

        out.push(Outgoing::ControllerSysex(self.surface.select_channel(channel)));
        out.push(Outgoing::ControllerSysex(
            self.surface.channel_indicator(channel),
        ));
        log::info!("Switched to channel {}", channel);

        self.lock_active(out);
    }

    fn toggle_freeze_into(&mut self, out: &mut Vec<Outgoing>) {
        let channel = self.channels.active();
        if self.calibration.state() == CalibrationState::Locked {
            self.calibration.release(&self.surface, &mut self.leds, out);
        } else if !self.patch.channel_has_any(channel) {
            log::info!("Nothing stored on channel {}, not freezing", channel);
        } else if self.lock_active(out) == 0 {
            log::info!(
                "No stored value on channel {} belongs to an encoder, not freezing",
                channel
            );
        }
    }

    fn reset_to_defaults_into(&mut self, out: &mut Vec<Outgoing>) {
        self.release_if_locked(out);
        let layout = self.surface.layout();
        for channel in Channel::all() {
            for encoder in layout.encoders() {
                if let (Some(control), Some(value)) =
                    (layout.control_for(encoder), self.surface.default_value(encoder))
                {
                    self.patch.set(channel, control, value);
                }
            }
        }
        log::info!("Patch reset to default values");
        self.lock_active(out);
    }

    fn recall_into(&mut self, out: &mut Vec<Outgoing>) {
        let channel = self.channels.active();
        let before = out.len();
        out.extend(
            self.patch
                .channel_values(channel)
                .map(|(control, value)| Outgoing::InstrumentControlChange {
                    channel,
                    control,
                    value,
                }),
        );
        log::info!(
            "Recalled {} value(s) on channel {}",
            out.len() - before,
            channel
        );
    }

    fn release_if_locked(&mut self, out: &mut Vec<Outgoing>) {
        if self.calibration.state() == CalibrationState::Locked {
            self.calibration.release(&self.surface, &mut self.leds, out);
        }
    }

    fn lock_active(&mut self, out: &mut Vec<Outgoing>) -> usize {
        let channel = self.channels.active();
        if !self.patch.channel_has_any(channel) {
            return 0;
        }
        self.calibration
            .lock(channel, &self.patch, &self.surface, &mut self.leds, out)
    }
}
