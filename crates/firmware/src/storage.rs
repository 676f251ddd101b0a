//! Emulates the handful of EEPROM bytes the device needs in the last sector of on-chip flash.
//!
//! The F7 has no EEPROM, and flash can only be written in whole `WRITE_SIZE` units after erasing an entire sector.
//! So the record is read once into RAM and writes are staged there. A flush which finds the staged record different
//! from the stored one erases the sector and programs the record again, once for however many bytes changed. That is
//! slow, but it only happens on first boot and when a new configuration is committed, and the device stops following
//! clock in the latter case anyway.

use beat_divider_lib::configuration::ByteStore;
use defmt::*;
use embassy_stm32::flash::{Blocking, Error, FLASH_SIZE, Flash, WRITE_SIZE};

/// Size of the last sector in single-bank mode (sectors 5 through 11 of the F767 are 256 KiB each).
const SECTOR_SIZE: u32 = 256 * 1024;

/// Offset of the last sector from the start of flash.
const SECTOR_OFFSET: u32 = FLASH_SIZE as u32 - SECTOR_SIZE;

const _: () = core::assert!(
    WRITE_SIZE >= 3,
    "the record must hold the magic cookie, divider and duration"
);

/// A [`ByteStore`] backed by the last sector of on-chip flash.
pub struct FlashStore<'d> {
    flash: Flash<'d, Blocking>,
    /// What the sector holds.
    stored: [u8; WRITE_SIZE],
    /// What it will hold after the next flush.
    staged: [u8; WRITE_SIZE],
}

impl<'d> FlashStore<'d> {
    /// Reads the stored record. A sector which has never been written reads as all `0xFF`.
    pub fn new(mut flash: Flash<'d, Blocking>) -> Result<Self, Error> {
        let mut record = [0; WRITE_SIZE];
        flash.blocking_read(SECTOR_OFFSET, &mut record)?;
        debug!("Read stored record: {}", record);
        Ok(Self {
            flash,
            stored: record,
            staged: record,
        })
    }
}

impl ByteStore for FlashStore<'_> {
    type Error = Error;

    fn read(&mut self, address: u8) -> Result<u8, Self::Error> {
        self.staged
            .get(usize::from(address))
            .copied()
            .ok_or(Error::Size)
    }

    fn write(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        let byte = self
            .staged
            .get_mut(usize::from(address))
            .ok_or(Error::Size)?;
        *byte = value;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.staged == self.stored {
            return Ok(());
        }

        info!("Writing record: {}", self.staged);
        self.flash
            .blocking_erase(SECTOR_OFFSET, SECTOR_OFFSET + SECTOR_SIZE)?;
        self.flash.blocking_write(SECTOR_OFFSET, &self.staged)?;
        self.stored = self.staged;
        Ok(())
    }
}
