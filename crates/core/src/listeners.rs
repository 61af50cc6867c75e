//! Listener registry.
//!
//! Handlers are keyed either by CC number or by a sysex pattern. Registering
//! the same key again replaces the earlier handler in place, so dispatch order
//! is always first-registration order.

use crate::layout::Control;
use crate::matcher::SysexPattern;
use crate::messages::MidiMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listener {
    Control(Control),
    Sysex(SysexPattern),
}

/// What a handler receives when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// CC value.
    Value(u8),
    /// Sysex payload beyond the registered pattern.
    Payload(Vec<u8>),
    /// Exact sysex match, nothing beyond the pattern.
    Bare,
}

#[derive(Debug, Clone)]
pub struct ListenerRegistry<H> {
    entries: Vec<(Listener, H)>,
}

impl<H: Clone> ListenerRegistry<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn on_control(&mut self, control: Control, handler: H) {
        self.register(Listener::Control(control), handler);
    }

    pub fn on_sysex(&mut self, pattern: SysexPattern, handler: H) {
        self.register(Listener::Sysex(pattern), handler);
    }

    fn register(&mut self, key: Listener, handler: H) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = handler,
            None => self.entries.push((key, handler)),
        }
    }

    /// Handlers that fire for `message`, with what each receives.
    pub fn dispatch(&self, message: &MidiMessage) -> Vec<(H, Trigger)> {
        match message {
            MidiMessage::ControlChange { control, value, .. } => self
                .entries
                .iter()
                .filter(|(key, _)| *key == Listener::Control(*control))
                .map(|(_, handler)| (handler.clone(), Trigger::Value(*value)))
                .collect(),
            MidiMessage::Sysex(bytes) => self
                .entries
                .iter()
                .filter_map(|(key, handler)| match key {
                    Listener::Sysex(pattern) => pattern.matches(bytes).map(|payload| {
                        let trigger = if payload.is_empty() {
                            Trigger::Bare
                        } else {
                            Trigger::Payload(payload)
                        };
                        (handler.clone(), trigger)
                    }),
                    Listener::Control(_) => None,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: Clone> Default for ListenerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
