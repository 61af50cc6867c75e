//! Active MIDI channel tracking.

use serde::{Deserialize, Serialize};

/// MIDI channel, 0-15.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel(u8);

impl Channel {
    pub const MIN: Channel = Channel(0);
    pub const MAX: Channel = Channel(15);

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX.0).then_some(Channel(value))
    }

    /// Channel nibble of a channel-voice status byte.
    pub fn from_status(status: u8) -> Self {
        Channel(status & 0x0F)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every channel, lowest first.
    pub fn all() -> impl Iterator<Item = Channel> {
        (Self::MIN.0..=Self::MAX.0).map(Channel)
    }

    pub fn next(self, boundary: ChannelBoundary) -> Self {
        match (self == Self::MAX, boundary) {
            (false, _) => Channel(self.0 + 1),
            (true, ChannelBoundary::Clamp) => self,
            (true, ChannelBoundary::Wrap) => Self::MIN,
        }
    }

    pub fn previous(self, boundary: ChannelBoundary) -> Self {
        match (self == Self::MIN, boundary) {
            (false, _) => Channel(self.0 - 1),
            (true, ChannelBoundary::Clamp) => self,
            (true, ChannelBoundary::Wrap) => Self::MAX,
        }
    }
}

impl std::fmt::Display for Channel {
    // Channels are shown 1-based, the way the hardware labels them.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// What happens when stepping past channel 0 or 15.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelBoundary {
    #[default]
    Clamp,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Owns the active channel and the stepping policy.
#[derive(Debug, Clone)]
pub struct ChannelController {
    active: Channel,
    boundary: ChannelBoundary,
}

impl ChannelController {
    pub fn new(boundary: ChannelBoundary) -> Self {
        Self {
            active: Channel::MIN,
            boundary,
        }
    }

    pub fn active(&self) -> Channel {
        self.active
    }

    /// Move one channel up or down and return the new active channel.
    pub fn step(&mut self, direction: Direction) -> Channel {
        self.active = match direction {
            Direction::Up => self.active.next(self.boundary),
            Direction::Down => self.active.previous(self.boundary),
        };
        self.active
    }

    /// Adopt the channel the device reported. Returns `None` when the report
    /// carries no valid channel.
    pub fn sync_from_report(&mut self, payload: &[u8]) -> Option<Channel> {
        let channel = payload.first().copied().and_then(Channel::new)?;
        self.active = channel;
        Some(channel)
    }
}
