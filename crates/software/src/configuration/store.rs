//! Provides [`ConfigStore`], which reads and writes a [`Configuration`] through any byte-addressable non-volatile
//! memory implementing [`ByteStore`].

use super::Configuration;

/// Byte-addressable non-volatile memory, such as EEPROM or an emulation of it in flash.
pub trait ByteStore {
    /// The error reported by the underlying device.
    type Error;

    /// Reads the byte at `address`.
    fn read(&mut self, address: u8) -> Result<u8, Self::Error>;

    /// Writes `value` at `address`. The write may be held back until the next [`flush`][Self::flush].
    fn write(&mut self, address: u8, value: u8) -> Result<(), Self::Error>;

    /// Makes every preceding write durable. Stores which write through have nothing to do.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Where each value lives within the [`ByteStore`].
pub mod address {
    /// Holds [`MAGIC_COOKIE`][super::MAGIC_COOKIE] once the store has been initialized.
    pub const MAGIC_COOKIE: u8 = 0;
    /// Holds [`Configuration::divider`][crate::configuration::Configuration::divider].
    pub const DIVIDER: u8 = 1;
    /// Holds [`Configuration::duration`][crate::configuration::Configuration::duration].
    pub const DURATION: u8 = 2;
}

/// Distinguishes a store this device has written from a factory-blank one.
pub const MAGIC_COOKIE: u8 = 0xC5;

/// Loads and commits the [`Configuration`].
#[derive(Debug)]
pub struct ConfigStore<S> {
    store: S,
}

impl<S: ByteStore> ConfigStore<S> {
    /// Constructs a [`ConfigStore`].
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reads the [`Configuration`].
    ///
    /// A blank store is initialized with [`Configuration::default`] (values first, magic cookie last, then a single
    /// flush) and the default is returned. An initialized store is only read, never written, and its values are
    /// returned as they are.
    pub fn load(&mut self) -> Result<Configuration, S::Error> {
        if self.store.read(address::MAGIC_COOKIE)? != MAGIC_COOKIE {
            let config = Configuration::default();
            info!(
                "Initializing blank store: divider {}, duration {}",
                config.divider, config.duration
            );
            self.write_values(config)?;
            self.store.write(address::MAGIC_COOKIE, MAGIC_COOKIE)?;
            self.store.flush()?;
            return Ok(config);
        }

        let config = Configuration {
            divider: self.store.read(address::DIVIDER)?,
            duration: self.store.read(address::DURATION)?,
        };
        info!(
            "Loaded configuration: divider {}, duration {}",
            config.divider, config.duration
        );
        Ok(config)
    }

    /// Writes the [`Configuration`] to an already initialized store. The magic cookie is left as it is.
    pub fn commit(&mut self, config: Configuration) -> Result<(), S::Error> {
        info!(
            "Committing configuration: divider {}, duration {}",
            config.divider, config.duration
        );
        self.write_values(config)?;
        self.store.flush()
    }

    /// Returns the underlying [`ByteStore`].
    pub fn into_inner(self) -> S {
        self.store
    }

    fn write_values(&mut self, config: Configuration) -> Result<(), S::Error> {
        self.store.write(address::DIVIDER, config.divider)?;
        self.store.write(address::DURATION, config.duration)
    }
}

/// A [`ByteStore`] held in RAM which counts writes and flushes, for exercising code that persists configuration.
#[cfg(test)]
pub(crate) mod mock {
    use super::ByteStore;
    use core::convert::Infallible;

    /// Erased EEPROM and flash both read back as all ones.
    const ERASED: u8 = 0xFF;

    #[derive(Debug, Clone, PartialEq)]
    pub struct MemoryStore {
        pub bytes: [u8; 16],
        pub writes: usize,
        pub flushes: usize,
    }

    impl MemoryStore {
        pub fn blank() -> Self {
            Self {
                bytes: [ERASED; 16],
                writes: 0,
                flushes: 0,
            }
        }

        pub fn with(cookie: u8, divider: u8, duration: u8) -> Self {
            let mut store = Self::blank();
            store.bytes[0] = cookie;
            store.bytes[1] = divider;
            store.bytes[2] = duration;
            store
        }
    }

    impl ByteStore for MemoryStore {
        type Error = Infallible;

        fn read(&mut self, address: u8) -> Result<u8, Self::Error> {
            Ok(self.bytes[address as usize])
        }

        fn write(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
            self.bytes[address as usize] = value;
            self.writes += 1;
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    /// Holds writes back until they are flushed, the way a store emulated in flash does.
    #[derive(Debug, Clone, PartialEq)]
    pub struct StagedStore {
        pub staged: [u8; 16],
        pub durable: [u8; 16],
    }

    impl StagedStore {
        pub fn blank() -> Self {
            Self {
                staged: [ERASED; 16],
                durable: [ERASED; 16],
            }
        }
    }

    impl ByteStore for StagedStore {
        type Error = Infallible;

        fn read(&mut self, address: u8) -> Result<u8, Self::Error> {
            Ok(self.staged[address as usize])
        }

        fn write(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
            self.staged[address as usize] = value;
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.durable = self.staged;
            Ok(())
        }
    }

    /// Fails every operation, for checking that errors propagate.
    pub struct BrokenStore;

    impl ByteStore for BrokenStore {
        type Error = ();

        fn read(&mut self, _address: u8) -> Result<u8, Self::Error> {
            Err(())
        }

        fn write(&mut self, _address: u8, _value: u8) -> Result<(), Self::Error> {
            Err(())
        }
    }
}
