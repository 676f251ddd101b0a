//! Beat Divider is [Embassy](https://embassy.dev)-based firmware for a MIDI beat indicator. The firmware runs on the
//! [Nucleo-F767ZI development board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which is powered by
//! an F7-series STM32 microcontroller.
//!
//! It listens to a DIN MIDI stream and, from the MIDI clock it carries, lights an indicator on every quarter note and
//! emits a pulse every N clocks, with N and the pulse width configured over MIDI by a System Exclusive message (see
//! [`beat_divider_lib::sysex`]). It also flashes an indicator for any incoming data and holds a pin high while the
//! sequencer is running.
//!
//! All of the logic lives in `beat_divider_lib`; this crate only wires it to the hardware.

#![no_std]
#![no_main]

mod io;
mod storage;

use crate::{io::Pins, storage::FlashStore};
use beat_divider_lib::{device::Device, timeout};
use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::{
    poll_once,
    select::{Either, select},
};
use embassy_stm32::{
    Config, bind_interrupts,
    flash::Flash,
    peripherals,
    usart::{self, BufferedUart},
};
use embassy_time::Ticker;
use embedded_io_async::Read;
use static_cell::StaticCell;

#[cfg(feature = "defmt-rtt")]
use defmt_rtt as _;
#[cfg(not(feature = "panic-probe"))]
use panic_halt as _;
#[cfg(feature = "panic-probe")]
use panic_probe as _;

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        USART2 => usart::BufferedInterruptHandler<peripherals::USART2>;
    }
);

/// The MIDI 1.0 DIN transport runs at 31.25 kbaud.
const MIDI_BAUD_RATE: u32 = 31_250;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing Beat Divider");

    let p = embassy_stm32::init(Config::default());

    // LD3 (red), LD1 (green) and LD2 (blue) on the Nucleo board; the pulse leaves on CN10
    let mut pins = Pins::new(p.PB14, p.PB0, p.PG0, p.PB7);
    pins.startup_flash().await;

    let store = unwrap!(FlashStore::new(Flash::new_blocking(p.FLASH)));
    let device = unwrap!(Device::new(store));
    info!("Loaded {}", device.configuration());

    static TX_BUFFER: StaticCell<[u8; 16]> = StaticCell::new();
    static RX_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();
    let mut config = usart::Config::default();
    config.baudrate = MIDI_BAUD_RATE;

    // USART2 is routed to CN9 on the Nucleo board: RX on PD6, TX (unused) on PD5
    let uart = unwrap!(BufferedUart::new(
        p.USART2,
        p.PD6,
        p.PD5,
        TX_BUFFER.init([0; 16]),
        RX_BUFFER.init([0; 64]),
        Irqs,
        config,
    ));

    unwrap!(spawner.spawn(device_task(device, uart, pins)));
}

/// The device's only task: everything it does happens here, one event at a time.
///
/// Received bytes take priority over the millisecond tick. When a byte wakes the task, the ticker is checked once
/// more so that a tick which fell due meanwhile is served in the same pass, after the byte.
#[embassy_executor::task]
async fn device_task(
    mut device: Device<FlashStore<'static>>,
    mut uart: BufferedUart<'static>,
    mut pins: Pins,
) -> ! {
    let mut ticker = Ticker::every(timeout::TICK);
    let mut buf = [0_u8; 1];

    loop {
        let woken = select(uart.read(&mut buf), ticker.next()).await;
        let (byte, elapsed) = match woken {
            Either::First(Ok(n)) if n > 0 => (Some(buf[0]), poll_once(ticker.next()).is_ready()),
            Either::First(Ok(_)) => continue,
            Either::First(Err(e)) => {
                // framing and overrun errors are cleared by the driver; the byte is gone, but reception carries on
                warn!("MIDI receive error: {}", e);
                continue;
            }
            Either::Second(()) => (None, true),
        };

        // committing a new configuration is the only thing that can fail, and only if the flash does
        let changed = unwrap!(device.service(byte, elapsed));
        pins.apply(device.levels(), changed);
    }
}
