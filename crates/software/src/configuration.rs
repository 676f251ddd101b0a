//! This module contains the device's only user-configurable settings, the pulse divider and pulse duration, and the
//! store which persists them across power cycles.

mod store;
pub use store::*;

#[cfg(test)]
pub(crate) use store::mock;

/// The settings which shape the divided pulse output.
///
/// Both values are raw bytes as received in the configuration message. Zero is never written by the device itself,
/// but a store is taken at its word when loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    /// Number of MIDI clocks per pulse. At 24 clocks per quarter note, 12 yields eighth notes, 6 sixteenth notes, and
    /// so on.
    pub divider: u8,
    /// Width of each pulse, in milliseconds.
    pub duration: u8,
}

impl Configuration {
    /// Eighth notes.
    pub const DEFAULT_DIVIDER: u8 = 12;

    /// Long enough for most analog gear to register a trigger.
    pub const DEFAULT_DURATION: u8 = 15;

    /// Constructs a [`Configuration`].
    pub const fn new(divider: u8, duration: u8) -> Self {
        Self { divider, duration }
    }

    /// Returns `true` if both values are non-zero, the only kind of configuration the device accepts over MIDI.
    pub fn is_valid(&self) -> bool {
        self.divider != 0 && self.duration != 0
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIVIDER, Self::DEFAULT_DURATION)
    }
}
