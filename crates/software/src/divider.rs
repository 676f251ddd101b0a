//! Divides incoming MIDI clock into quarter notes and into pulses of a configurable length.
//!
//! Two counters advance on every clock. The quarter note counter follows song position: it restarts when the
//! sequencer is started from the top. The pulse counter does not. It keeps its phase across Start, Stop and Continue
//! so that the pulse output stays locked to real time rather than to the song.

use crate::output::Output;

/// MIDI beat clock resolution, in clocks per quarter note.
pub const PPQN: u8 = 24;

/// Counts clocks and decides which beats fall on each one.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockDivider {
    divider: u8,
    clock_ticks: u8,
    pulse_ticks: u8,
}

impl ClockDivider {
    /// Constructs a [`ClockDivider`] producing one pulse every `divider` clocks.
    ///
    /// A divider of zero or one pulses on every clock.
    pub fn new(divider: u8) -> Self {
        Self {
            divider,
            clock_ticks: 0,
            pulse_ticks: 0,
        }
    }

    /// Advances both counters by one clock and returns the beats which fall on it: [`Output::QuarterNote`] on the
    /// first clock of a quarter note and [`Output::Pulse`] on the first clock of a pulse period.
    pub fn clock(&mut self) -> Output {
        let mut beats = Output::none();

        if self.clock_ticks == 0 {
            beats |= Output::QuarterNote;
        }
        self.clock_ticks += 1;
        if self.clock_ticks >= PPQN {
            self.clock_ticks = 0;
        }

        if self.pulse_ticks == 0 {
            beats |= Output::Pulse;
        }
        self.pulse_ticks = self.pulse_ticks.wrapping_add(1);
        if self.pulse_ticks >= self.divider {
            self.pulse_ticks = 0;
        }

        beats
    }

    /// Realigns the quarter note so that the next clock begins one. The pulse phase is left alone.
    pub fn start(&mut self) {
        self.clock_ticks = 0;
    }

    /// Position within the current quarter note, `0..24`.
    pub fn clock_ticks(&self) -> u8 {
        self.clock_ticks
    }

    /// Position within the current pulse period, `0..divider`.
    pub fn pulse_ticks(&self) -> u8 {
        self.pulse_ticks
    }

    /// Clocks per pulse.
    pub fn divider(&self) -> u8 {
        self.divider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns the indices of the clocks (out of `count`) on which `beat` fell.
    fn beats_at(divider: &mut ClockDivider, count: usize, beat: Output) -> impl Iterator<Item = usize> {
        (0..count).filter(move |_| divider.clock().contains(beat))
    }

    #[test]
    fn first_clock_is_a_quarter_note_and_a_pulse() {
        let mut divider = ClockDivider::new(12);
        assert_eq!(
            Output::QuarterNote | Output::Pulse,
            divider.clock(),
            "Expected left but got right"
        );
    }

    #[test]
    fn quarter_note_every_24_clocks_regardless_of_divider() {
        for d in [1, 2, 5, 7, 12, 24, 37, 255] {
            let mut divider = ClockDivider::new(d);
            let mut quarter_notes = [0_usize; 5];
            let mut found = 0;
            for (i, clock) in beats_at(&mut divider, 120, Output::QuarterNote).enumerate() {
                quarter_notes[i] = clock;
                found += 1;
            }
            assert_eq!(5, found, "Divider {} should not affect the quarter note count", d);
            assert_eq!([0, 24, 48, 72, 96], quarter_notes, "Expected left but got right");
        }
    }

    #[test]
    fn pulse_every_divider_clocks() {
        for d in [1_u8, 3, 8, 12, 24, 48] {
            let mut divider = ClockDivider::new(d);
            let clocks = 240;
            let mut expected = 0;
            for clock in beats_at(&mut divider, clocks, Output::Pulse) {
                assert_eq!(expected, clock, "Divider {}: expected left but got right", d);
                expected += d as usize;
            }
            assert_eq!(
                clocks.div_ceil(d as usize),
                expected / d as usize,
                "Divider {}: wrong number of pulses",
                d
            );
        }
    }

    #[test]
    fn zero_divider_pulses_every_clock() {
        let mut divider = ClockDivider::new(0);
        for _ in 0..50 {
            assert!(divider.clock().contains(Output::Pulse));
        }
    }

    #[test]
    fn start_realigns_quarter_note_only() {
        let mut divider = ClockDivider::new(5);
        for _ in 0..7 {
            divider.clock();
        }
        divider.start();

        assert_eq!(0, divider.clock_ticks());
        assert_eq!(2, divider.pulse_ticks(), "Pulse phase should survive Start");

        let beats = divider.clock();
        assert!(beats.contains(Output::QuarterNote), "Next clock should begin a quarter note");
        assert!(!beats.contains(Output::Pulse), "Next clock is mid-pulse");
    }

    #[test]
    fn counters_wrap() {
        let mut divider = ClockDivider::new(10);
        for _ in 0..24 {
            divider.clock();
        }
        assert_eq!(0, divider.clock_ticks());
        assert_eq!(4, divider.pulse_ticks());
    }
}
