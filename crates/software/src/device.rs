use crate::{
    configuration::{ByteStore, ConfigStore, Configuration},
    divider::ClockDivider,
    output::{Levels, Output},
    realtime::Event,
    sysex::SysexMatcher,
    timeout::{Countdown, DATA_ACTIVITY_TICKS, QUARTER_NOTE_TICKS, Timeouts},
};

/// How long each phase of the reset indicator lasts, in ticks.
pub const RESET_FLASH_TICKS: u8 = 200;

/// The outputs which alternate while awaiting reset.
fn reset_indicator() -> Output {
    Output::DataActivity | Output::QuarterNote
}

/// Whether the device is doing its job or waiting to be power cycled.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Following MIDI clock and listening for configuration.
    Normal,
    /// A new configuration has been stored. Received bytes are ignored and the data activity and quarter note
    /// indicators flash in alternation until the device is power cycled, at which point the new configuration is
    /// loaded. There is no way back to [`Mode::Normal`] otherwise.
    AwaitingReset,
}

/// The whole device: configuration, counters, and output levels, advanced one [`Event`] at a time.
///
/// Every event runs to completion before the next is accepted, so no state is ever shared with anything else.
#[derive(Debug)]
pub struct Device<S> {
    store: ConfigStore<S>,
    config: Configuration,
    mode: Mode,
    levels: Levels,
    timeouts: Timeouts,
    divider: ClockDivider,
    sysex: SysexMatcher,
    reset_flash: Countdown,
}

impl<S: ByteStore> Device<S> {
    /// Constructs a [`Device`], loading its [`Configuration`] from `store` (and initializing a blank store).
    ///
    /// All outputs start low, all counters at zero.
    pub fn new(store: S) -> Result<Self, S::Error> {
        let mut store = ConfigStore::new(store);
        let config = store.load()?;
        Ok(Self {
            store,
            config,
            mode: Mode::Normal,
            levels: Levels::default(),
            timeouts: Timeouts::default(),
            divider: ClockDivider::new(config.divider),
            sysex: SysexMatcher::new(),
            reset_flash: Countdown::default(),
        })
    }

    /// Serves one wakeup, during which a byte may have been received and a millisecond may have elapsed.
    ///
    /// The byte is always handled first. Returns every output written by either.
    pub fn service(&mut self, byte: Option<u8>, elapsed: bool) -> Result<Output, S::Error> {
        let mut changed = Output::none();
        if let Some(byte) = byte {
            changed |= self.handle(Event::classify(byte))?;
        }
        if elapsed {
            changed |= self.handle(Event::Millisecond)?;
        }
        Ok(changed)
    }

    /// Handles a single [`Event`], returning the outputs it wrote. Their new levels are available from
    /// [`levels`][Self::levels].
    ///
    /// Only committing a new configuration can fail, and only if the store does.
    pub fn handle(&mut self, event: Event) -> Result<Output, S::Error> {
        if self.mode == Mode::AwaitingReset {
            return Ok(match event {
                Event::Millisecond => self.flash_reset_indicator(),
                _ => Output::none(),
            });
        }

        if event == Event::Millisecond {
            let expired = self.timeouts.tick();
            self.levels.set_low(expired);
            return Ok(expired);
        }

        let mut changed = self.raise(Output::DataActivity, DATA_ACTIVITY_TICKS);
        match event {
            Event::Clock => {
                let beats = self.divider.clock();
                if beats.contains(Output::QuarterNote) {
                    changed |= self.raise(Output::QuarterNote, QUARTER_NOTE_TICKS);
                }
                if beats.contains(Output::Pulse) {
                    changed |= self.raise(Output::Pulse, self.config.duration);
                }
            }
            Event::Start => {
                info!("Transport started");
                self.divider.start();
                changed |= self.set_running(true);
            }
            Event::Continue => {
                info!("Transport continued");
                changed |= self.set_running(true);
            }
            Event::Stop => {
                info!("Transport stopped");
                changed |= self.set_running(false);
            }
            Event::Other(byte) => {
                if let Some(config) = self.sysex.advance(byte) {
                    self.store.commit(config)?;
                    changed |= self.await_reset();
                }
            }
            Event::Millisecond => {}
        }
        Ok(changed)
    }

    /// Current output levels.
    pub fn levels(&self) -> Levels {
        self.levels
    }

    /// Current [`Mode`].
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The [`Configuration`] in effect, as loaded at startup.
    pub fn configuration(&self) -> Configuration {
        self.config
    }

    /// The clock counters.
    pub fn divider(&self) -> &ClockDivider {
        &self.divider
    }

    /// Progress through any configuration message being received.
    pub fn sysex(&self) -> &SysexMatcher {
        &self.sysex
    }

    /// Consumes the device, returning its [`ByteStore`].
    pub fn into_store(self) -> S {
        self.store.into_inner()
    }

    fn raise(&mut self, output: Output, ticks: u8) -> Output {
        self.levels.set_high(output);
        self.timeouts.arm(output, ticks);
        output
    }

    fn set_running(&mut self, running: bool) -> Output {
        if running {
            self.levels.set_high(Output::Running);
        } else {
            self.levels.set_low(Output::Running);
        }
        Output::Running
    }

    /// Enters [`Mode::AwaitingReset`], leaving only the data activity indicator lit.
    fn await_reset(&mut self) -> Output {
        info!("Configuration stored; awaiting reset");
        self.mode = Mode::AwaitingReset;
        self.timeouts.clear();
        self.levels.set_low(Output::QuarterNote | Output::Pulse | Output::Running);
        self.levels.set_high(Output::DataActivity);
        self.reset_flash.arm(RESET_FLASH_TICKS);
        Output::EACH
            .into_iter()
            .fold(Output::none(), |all, output| all | output)
    }

    fn flash_reset_indicator(&mut self) -> Output {
        if self.reset_flash.tick() {
            self.levels.toggle(reset_indicator());
            self.reset_flash.arm(RESET_FLASH_TICKS);
            reset_indicator()
        } else {
            Output::none()
        }
    }
}
