//! The four signals the device drives: three momentary indicators and the level-driven transport state.

use bitmask_enum::bitmask;

/// A set of output signals.
///
/// Used in two ways: as the current levels of the outputs (a set flag means the signal is high) and as the
/// report of which outputs an event wrote, so the caller knows which pins need updating.
#[bitmask(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Output {
    /// Flashes briefly for every byte received, regardless of its meaning.
    DataActivity,
    /// Lights on the first clock of every quarter note.
    QuarterNote,
    /// The divided clock output, asserted every `divider` clocks for `duration` milliseconds.
    Pulse,
    /// High while the sequencer sending clock is running.
    Running,
}

impl Output {
    /// Every individual output, in pin order.
    pub const EACH: [Output; 4] = [
        Output::DataActivity,
        Output::QuarterNote,
        Output::Pulse,
        Output::Running,
    ];

    /// Iterates over the individual outputs contained in this set.
    pub fn iter(self) -> impl Iterator<Item = Output> {
        Self::EACH
            .into_iter()
            .filter(move |&output| self.contains(output))
    }
}

/// The levels of all outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Levels {
    high: Output,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            high: Output::none(),
        }
    }
}

impl Levels {
    /// Returns `true` if the given output is currently driven high.
    pub fn is_high(&self, output: Output) -> bool {
        self.high.contains(output)
    }

    /// Drives the given outputs high.
    pub fn set_high(&mut self, outputs: Output) {
        self.high |= outputs;
    }

    /// Drives the given outputs low.
    pub fn set_low(&mut self, outputs: Output) {
        self.high &= !outputs;
    }

    /// Inverts the level of the given outputs.
    pub fn toggle(&mut self, outputs: Output) {
        self.high ^= outputs;
    }

    /// Returns the set of outputs currently driven high.
    pub fn high(&self) -> Output {
        self.high
    }
}
