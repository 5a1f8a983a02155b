//! Logging shim
//!
//! Forwards to `defmt` when this crate's `defmt` feature is enabled and
//! compiles to nothing otherwise. Arguments are still borrowed in the
//! disabled case so callers never see unused-variable warnings.
//!
//! The macros are exported for the app crates; a crate calling them with
//! the feature on must depend on `defmt` itself.
#![macro_use]
#![allow(unused_macros)]

#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        $crate::__private::defmt::trace!($s $(, $x)*)
    };
}

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            let _ = ($( & $x ),*);
        }
    };
}

#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        $crate::__private::defmt::debug!($s $(, $x)*)
    };
}

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            let _ = ($( & $x ),*);
        }
    };
}

#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        $crate::__private::defmt::info!($s $(, $x)*)
    };
}

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            let _ = ($( & $x ),*);
        }
    };
}

#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        $crate::__private::defmt::warn!($s $(, $x)*)
    };
}

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            let _ = ($( & $x ),*);
        }
    };
}

#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        $crate::__private::defmt::error!($s $(, $x)*)
    };
}

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            let _ = ($( & $x ),*);
        }
    };
}
