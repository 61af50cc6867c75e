//! Sysex pattern matching.
//!
//! A registered pattern stands for "this message type, any payload": matching
//! returns whatever the observed message carries beyond the pattern.

use crate::messages::SYSEX_END;

/// A registered sysex pattern, usually a full `F0 .. F7` message with the
/// payload left off.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SysexPattern(Vec<u8>);

impl SysexPattern {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// See [`match_sysex`].
    pub fn matches(&self, message: &[u8]) -> Option<Vec<u8>> {
        match_sysex(&self.0, message)
    }
}

/// Compare `pattern` against `message`.
///
/// Returns `None` when the message does not match. On a match, returns the
/// message bytes beyond the pattern (minus the trailing `F7`), which is empty
/// for an exact match.
pub fn match_sysex(pattern: &[u8], message: &[u8]) -> Option<Vec<u8>> {
    if pattern.len() > message.len() {
        return None;
    }
    if pattern == message {
        return Some(Vec::new());
    }

    let prefix = pattern.strip_suffix(&[SYSEX_END]).unwrap_or(pattern);
    if !message.starts_with(prefix) {
        return None;
    }

    let rest = &message[prefix.len()..];
    let rest = rest.strip_suffix(&[SYSEX_END]).unwrap_or(rest);
    Some(rest.to_vec())
}
