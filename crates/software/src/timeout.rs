//! Millisecond countdowns which bound how long the momentary outputs stay high.
//!
//! The scheduler is the only component which ever drives an indicator low: the other components raise an output
//! and arm its countdown, and the countdown lowers it again once the configured number of ticks have elapsed.

use crate::output::Output;
use embassy_time::Duration;

/// How often [`Timeouts::tick`] is expected to be called.
pub const TICK: Duration = Duration::from_millis(1);

/// How long the data activity indicator stays lit after a byte is received, in ticks.
pub const DATA_ACTIVITY_TICKS: u8 = 1;

/// How long the quarter note indicator stays lit, in ticks.
pub const QUARTER_NOTE_TICKS: u8 = 50;

/// A single countdown. Zero means inactive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Countdown(u8);

impl Countdown {
    /// (Re)starts the countdown. Arming with zero leaves it inactive.
    pub fn arm(&mut self, ticks: u8) {
        self.0 = ticks;
    }

    /// Advances by one tick. Returns `true` exactly once: on the tick that brings an active countdown to zero.
    pub fn tick(&mut self) -> bool {
        match self.0 {
            0 => false,
            n => {
                self.0 = n - 1;
                self.0 == 0
            }
        }
    }
}

/// The countdowns belonging to each momentary output.
///
/// [`Output::Running`] has no countdown; it follows transport state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeouts {
    data_activity: Countdown,
    quarter_note: Countdown,
    pulse: Countdown,
}

impl Timeouts {
    /// Arms the countdown for the given output. Outputs without a countdown are ignored.
    pub fn arm(&mut self, output: Output, ticks: u8) {
        if let Some(countdown) = self.countdown_mut(output) {
            countdown.arm(ticks);
        }
    }

    /// Deactivates every countdown without reporting any expiry.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Advances every countdown by one tick and returns the outputs whose countdowns expired on this tick,
    /// which are the outputs the caller must now drive low.
    pub fn tick(&mut self) -> Output {
        let mut expired = Output::none();
        if self.data_activity.tick() {
            expired |= Output::DataActivity;
        }
        if self.quarter_note.tick() {
            expired |= Output::QuarterNote;
        }
        if self.pulse.tick() {
            expired |= Output::Pulse;
        }
        expired
    }

    fn countdown_mut(&mut self, output: Output) -> Option<&mut Countdown> {
        if output == Output::DataActivity {
            Some(&mut self.data_activity)
        } else if output == Output::QuarterNote {
            Some(&mut self.quarter_note)
        } else if output == Output::Pulse {
            Some(&mut self.pulse)
        } else {
            None
        }
    }
}
