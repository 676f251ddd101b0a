//! Classifies received bytes, separating the [MIDI realtime](https://midi.org/midi-1-0) transport messages the
//! device acts on from everything else.

use wmidi::MidiMessage;

/// Everything the [`Device`][crate::device::Device] reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Timing Clock (0xF8), sent 24 times per quarter note.
    Clock,
    /// Start (0xFA): the sequencer started from the top.
    Start,
    /// Continue (0xFB): the sequencer resumed from where it stopped.
    Continue,
    /// Stop (0xFC).
    Stop,
    /// Any other received byte, to be considered by the [`SysexMatcher`][crate::sysex::SysexMatcher].
    Other(u8),
    /// One millisecond elapsed.
    Millisecond,
}

impl Event {
    /// Classifies a received byte.
    ///
    /// Realtime messages are a single status byte, so the byte is parsed on its own. Only the four transport messages
    /// are singled out; other realtime bytes (Active Sensing, Reset, the undefined ones) are no different from data.
    pub fn classify(byte: u8) -> Self {
        match MidiMessage::from_bytes(&[byte]) {
            Ok(MidiMessage::TimingClock) => Self::Clock,
            Ok(MidiMessage::Start) => Self::Start,
            Ok(MidiMessage::Continue) => Self::Continue,
            Ok(MidiMessage::Stop) => Self::Stop,
            _ => Self::Other(byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_messages() {
        assert_eq!(Event::Clock, Event::classify(0xF8));
        assert_eq!(Event::Start, Event::classify(0xFA));
        assert_eq!(Event::Continue, Event::classify(0xFB));
        assert_eq!(Event::Stop, Event::classify(0xFC));
    }

    #[test]
    fn other_realtime_bytes_pass_through() {
        for byte in [0xF9, 0xFD, 0xFE, 0xFF] {
            assert_eq!(
                Event::Other(byte),
                Event::classify(byte),
                "Expected left but got right"
            );
        }
    }

    #[test]
    fn everything_else_passes_through() {
        for byte in 0x00..=0xF7 {
            assert_eq!(
                Event::Other(byte),
                Event::classify(byte),
                "Expected left but got right"
            );
        }
    }
}
