//! Recognizes the System Exclusive message which reconfigures the device:
//!
//! ```text
//! F0 00 7F 18 0A 05 <divider> <duration> F7
//! ```
//!
//! Matching is strictly positional. Each byte is compared against the one expected at the current position and any
//! mismatch returns the matcher to idle; the mismatched byte itself is not reconsidered, even when it is a fresh
//! `F0`. Realtime bytes never reach the matcher, so clock interleaved with the message does not disturb it.

use crate::configuration::Configuration;

/// Start of System Exclusive.
pub const SYSEX_START: u8 = 0xF0;

/// End of System Exclusive.
pub const SYSEX_END: u8 = 0xF7;

/// Manufacturer ID and device-specific header which follow [`SYSEX_START`].
pub const HEADER: [u8; 5] = [0x00, 0x7F, 0x18, 0x0A, 0x05];

/// Length of the complete message, start and end bytes included.
pub const MESSAGE_LEN: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Expect {
    Byte(u8),
    Divider,
    Duration,
}

const PATTERN: [Expect; MESSAGE_LEN] = [
    Expect::Byte(SYSEX_START),
    Expect::Byte(HEADER[0]),
    Expect::Byte(HEADER[1]),
    Expect::Byte(HEADER[2]),
    Expect::Byte(HEADER[3]),
    Expect::Byte(HEADER[4]),
    Expect::Divider,
    Expect::Duration,
    Expect::Byte(SYSEX_END),
];

/// Builds the message which configures a device with `config`.
pub fn message(config: Configuration) -> [u8; MESSAGE_LEN] {
    let mut bytes = [0; MESSAGE_LEN];
    for (byte, expect) in bytes.iter_mut().zip(PATTERN) {
        *byte = match expect {
            Expect::Byte(b) => b,
            Expect::Divider => config.divider,
            Expect::Duration => config.duration,
        };
    }
    bytes
}

/// Tracks progress through the configuration message one byte at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SysexMatcher {
    /// Position of the next expected byte; zero when idle.
    index: u8,
    new_divider: u8,
    new_duration: u8,
}

impl SysexMatcher {
    /// Constructs an idle [`SysexMatcher`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the next expected byte within the message, `0..9`. Zero means idle.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Returns `true` when no message is in progress.
    pub fn is_idle(&self) -> bool {
        self.index == 0
    }

    /// Considers the next non-realtime byte.
    ///
    /// Returns the received [`Configuration`] when `byte` completes a message whose divider and duration are both
    /// non-zero. A complete message carrying a zero is discarded.
    pub fn advance(&mut self, byte: u8) -> Option<Configuration> {
        match PATTERN[usize::from(self.index)] {
            Expect::Byte(expected) if byte != expected => {
                if !self.is_idle() {
                    debug!(
                        "Sysex mismatch at position {}: expected {:#x}, got {:#x}",
                        self.index, expected, byte
                    );
                }
                self.reset();
                None
            }
            Expect::Byte(_) if usize::from(self.index) == MESSAGE_LEN - 1 => {
                let config = Configuration::new(self.new_divider, self.new_duration);
                self.reset();
                if config.is_valid() {
                    Some(config)
                } else {
                    warn!(
                        "Discarding configuration with a zero value: divider {}, duration {}",
                        config.divider, config.duration
                    );
                    None
                }
            }
            Expect::Byte(_) => {
                self.index += 1;
                None
            }
            Expect::Divider => {
                self.new_divider = byte;
                self.index += 1;
                None
            }
            Expect::Duration => {
                self.new_duration = byte;
                self.index += 1;
                None
            }
        }
    }

    fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feeds every byte to the matcher, returning the configuration if any byte completed a message.
    fn feed(matcher: &mut SysexMatcher, bytes: &[u8]) -> Option<Configuration> {
        bytes.iter().fold(None, |found, &byte| matcher.advance(byte).or(found))
    }

    #[test]
    fn message_layout() {
        assert_eq!(
            [0xF0, 0x00, 0x7F, 0x18, 0x0A, 0x05, 0x08, 0x0A, 0xF7],
            message(Configuration::new(8, 10)),
            "Expected left but got right"
        );
    }

    #[test]
    fn accepts_valid_message() {
        let mut matcher = SysexMatcher::new();
        let bytes = [0xF0, 0x00, 0x7F, 0x18, 0x0A, 0x05, 0x08, 0x0A, 0xF7];
        for (i, &byte) in bytes[..8].iter().enumerate() {
            assert_eq!(None, matcher.advance(byte));
            assert_eq!(i as u8 + 1, matcher.index(), "Should advance on every byte");
        }
        assert_eq!(
            Some(Configuration::new(8, 10)),
            matcher.advance(bytes[8]),
            "Expected left but got right"
        );
        assert!(matcher.is_idle(), "Should return to idle after a complete message");
    }

    #[test]
    fn payload_may_be_any_byte() {
        let mut matcher = SysexMatcher::new();
        let config = Configuration::new(0xF7, 0xF0);
        assert_eq!(Some(config), feed(&mut matcher, &message(config)));
    }

    #[test]
    fn zero_divider_is_discarded() {
        let mut matcher = SysexMatcher::new();
        assert_eq!(
            None,
            feed(&mut matcher, &[0xF0, 0x00, 0x7F, 0x18, 0x0A, 0x05, 0x00, 0x0A, 0xF7])
        );
        assert!(matcher.is_idle());

        // ready for the next message straight away
        assert_eq!(
            Some(Configuration::new(6, 20)),
            feed(&mut matcher, &message(Configuration::new(6, 20)))
        );
    }

    #[test]
    fn zero_duration_is_discarded() {
        let mut matcher = SysexMatcher::new();
        assert_eq!(None, feed(&mut matcher, &message(Configuration::new(8, 0))));
        assert!(matcher.is_idle());
    }

    #[test]
    fn zero_payload_with_wrong_terminator_is_discarded() {
        let mut matcher = SysexMatcher::new();
        assert_eq!(
            None,
            feed(&mut matcher, &[0xF0, 0x00, 0x7F, 0x18, 0x0A, 0x05, 0x00, 0x0A, 0x42])
        );
        assert!(matcher.is_idle());
    }

    #[test]
    fn wrong_terminator_resets() {
        let mut matcher = SysexMatcher::new();
        assert_eq!(
            None,
            feed(&mut matcher, &[0xF0, 0x00, 0x7F, 0x18, 0x0A, 0x05, 0x08, 0x0A, 0x00])
        );
        assert!(matcher.is_idle());
    }

    #[test]
    fn idle_ignores_anything_but_start() {
        let mut matcher = SysexMatcher::new();
        for byte in [0x00, 0x7F, 0x90, 0x3C, 0x64, 0xF7] {
            assert_eq!(None, matcher.advance(byte));
            assert!(matcher.is_idle(), "Expected to stay idle on {:#x}", byte);
        }
    }

    #[test]
    fn divergence_resets_at_every_header_position() {
        let valid = message(Configuration::new(8, 10));
        for position in 1..6 {
            let mut matcher = SysexMatcher::new();
            feed(&mut matcher, &valid[..position]);
            assert_eq!(position as u8, matcher.index());

            let wrong = valid[position].wrapping_add(1);
            assert_eq!(None, matcher.advance(wrong));
            assert!(
                matcher.is_idle(),
                "Mismatch at position {} should reset",
                position
            );
        }
    }

    #[test]
    fn divergent_message_does_not_affect_later_bytes() {
        let mut matcher = SysexMatcher::new();
        assert_eq!(None, feed(&mut matcher, &[0xF0, 0x00, 0x7F, 0x19, 0x0A, 0x05, 0x08]));
        assert!(matcher.is_idle());
        assert_eq!(
            Some(Configuration::new(8, 10)),
            feed(&mut matcher, &message(Configuration::new(8, 10)))
        );
    }

    #[test]
    fn repeated_start_is_a_mismatch() {
        let mut matcher = SysexMatcher::new();
        matcher.advance(SYSEX_START);
        matcher.advance(SYSEX_START);
        assert!(
            matcher.is_idle(),
            "A second F0 is not reconsidered as the start of a new message"
        );

        // the message that follows is therefore missing its start byte and never matches
        let rest = &message(Configuration::new(8, 10))[1..];
        assert_eq!(None, feed(&mut matcher, rest));
    }
}
