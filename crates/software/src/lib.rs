//! This crate contains architecture-agnostic logic for the Beat Divider, a device which passively listens to a
//! [MIDI](https://midi.org/midi-1-0) stream and derives status indicators and a divided pulse clock from the
//! [MIDI beat clock](https://en.wikipedia.org/wiki/MIDI_beat_clock) it carries.
//!
//! Everything the device does is modeled as a single owner, [`Device`][device::Device], fed one [`Event`][realtime::Event]
//! at a time. Events are either bytes received on the MIDI input or the elapse of one millisecond; each runs to
//! completion before the next is considered. The firmware crate supplies the hardware: a UART, GPIO pins, a
//! millisecond ticker, and some non-volatile storage (see [`ByteStore`][configuration::ByteStore]).

#![deny(missing_docs)]
#![no_std]

#[macro_use]
mod fmt;

pub mod configuration;

/// The top-level state machine which routes events to the components below.
pub mod device;

pub mod divider;
pub mod output;
pub mod realtime;
pub mod sysex;
pub mod timeout;
