//! Drives the GPIO pins behind each of the device's [outputs](`Signal`).

use beat_divider_lib::output::{Levels, Output as Signal};
use embassy_stm32::{
    Peri,
    gpio::{Level, Output, Pin, Speed},
};
use embassy_time::Timer;

/// How long the indicators light up at power-on.
const STARTUP_FLASH_MS: u64 = 200;

/// The pins behind each [`Signal`].
pub struct Pins {
    data_activity: Output<'static>,
    quarter_note: Output<'static>,
    pulse: Output<'static>,
    running: Output<'static>,
}

impl Pins {
    /// Configures each pin as a push-pull output, initially low.
    pub fn new(
        data_activity: Peri<'static, impl Pin>,
        quarter_note: Peri<'static, impl Pin>,
        pulse: Peri<'static, impl Pin>,
        running: Peri<'static, impl Pin>,
    ) -> Self {
        Self {
            data_activity: Output::new(data_activity, Level::Low, Speed::Low),
            quarter_note: Output::new(quarter_note, Level::Low, Speed::Low),
            pulse: Output::new(pulse, Level::Low, Speed::Low),
            running: Output::new(running, Level::Low, Speed::Low),
        }
    }

    /// Briefly lights both indicators so the performer can tell the device has powered up.
    pub async fn startup_flash(&mut self) {
        self.data_activity.set_high();
        self.quarter_note.set_high();
        Timer::after_millis(STARTUP_FLASH_MS).await;
        self.data_activity.set_low();
        self.quarter_note.set_low();
    }

    /// Brings the `changed` pins in line with `levels`.
    pub fn apply(&mut self, levels: Levels, changed: Signal) {
        for signal in changed.iter() {
            let level = if levels.is_high(signal) {
                Level::High
            } else {
                Level::Low
            };
            if let Some(pin) = self.pin(signal) {
                pin.set_level(level);
            }
        }
    }

    fn pin(&mut self, signal: Signal) -> Option<&mut Output<'static>> {
        if signal == Signal::DataActivity {
            Some(&mut self.data_activity)
        } else if signal == Signal::QuarterNote {
            Some(&mut self.quarter_note)
        } else if signal == Signal::Pulse {
            Some(&mut self.pulse)
        } else if signal == Signal::Running {
            Some(&mut self.running)
        } else {
            None
        }
    }
}
