//! Logging macros which forward to `defmt` when the feature is enabled and compile away otherwise, so host-side
//! tests run without a global logger.

#![allow(unused_macros)]

macro_rules! debug {
    ($($x:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($x)*);
        #[cfg(not(feature = "defmt"))]
        let _ = format_args!($($x)*);
    }};
}

macro_rules! info {
    ($($x:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($x)*);
        #[cfg(not(feature = "defmt"))]
        let _ = format_args!($($x)*);
    }};
}

macro_rules! warn {
    ($($x:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($x)*);
        #[cfg(not(feature = "defmt"))]
        let _ = format_args!($($x)*);
    }};
}
