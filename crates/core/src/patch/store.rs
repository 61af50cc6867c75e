//! Channel-scoped CC value store.

use std::collections::BTreeMap;

use crate::channel::Channel;
use crate::layout::Control;

/// Value reported for a control that has nothing stored (mid-scale).
pub const DEFAULT_VALUE: u8 = 64;

/// Per-channel CC values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    channels: BTreeMap<Channel, BTreeMap<Control, u8>>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, channel: Channel, control: Control) -> bool {
        self.channels
            .get(&channel)
            .is_some_and(|values| values.contains_key(&control))
    }

    /// Stored value, or [`DEFAULT_VALUE`] when nothing is stored.
    pub fn get(&self, channel: Channel, control: Control) -> u8 {
        self.channels
            .get(&channel)
            .and_then(|values| values.get(&control))
            .copied()
            .unwrap_or(DEFAULT_VALUE)
    }

    pub fn set(&mut self, channel: Channel, control: Control, value: u8) {
        debug_assert!(value <= 127, "CC value {value} out of range");
        self.channels
            .entry(channel)
            .or_default()
            .insert(control, value.min(127));
    }

    pub fn channel_has_any(&self, channel: Channel) -> bool {
        self.channels
            .get(&channel)
            .is_some_and(|values| !values.is_empty())
    }

    /// `(control, value)` pairs stored under `channel`, by control number.
    pub fn channel_values(&self, channel: Channel) -> impl Iterator<Item = (Control, u8)> + '_ {
        self.channels
            .get(&channel)
            .into_iter()
            .flat_map(|values| values.iter().map(|(&control, &value)| (control, value)))
    }

    /// Every `(channel, control, value)` triple.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, Control, u8)> + '_ {
        self.channels.iter().flat_map(|(&channel, values)| {
            values
                .iter()
                .map(move |(&control, &value)| (channel, control, value))
        })
    }

    /// Total number of stored values.
    pub fn len(&self) -> usize {
        self.channels.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
