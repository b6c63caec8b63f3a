//! Conditional logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! Modules that log on a per-frame cadence define
//! `const ENABLE_LOGS: bool = ...;` and use these instead of the plain
//! `log` macros, so chatty output can be shut off per module.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
