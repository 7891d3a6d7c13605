//! Conditional logging macros gated on a module-level `ENABLE_LOGS` flag,
//! plus the process-wide logger bootstrap.
//!
//! Usage:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn};
//!
//! log_info!("decode loop started on {}", device_id);
//! ```

/// Environment switch that turns on per-frame diagnostics in the decode loop.
pub const DEBUG_ENV_VAR: &str = "QRSCAN_DEBUG";

/// Initialise `env_logger` (reads `RUST_LOG`, defaults to `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Whether `QRSCAN_DEBUG` is set to `1` or `true`.
pub fn debug_mode() -> bool {
    std::env::var(DEBUG_ENV_VAR)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[doc(hidden)]
#[macro_export]
macro_rules! gated_log {
    ($level:ident, $($arg:tt)*) => {
        if ENABLE_LOGS {
            log::$level!($($arg)*);
        }
    };
}

/// `log::info!` unless the calling module sets `ENABLE_LOGS = false`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::gated_log!(info, $($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::gated_log!(warn, $($arg)*) };
}

/// Only used for per-frame and corruption diagnostics.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::gated_log!(debug, $($arg)*) };
}
