/// Macro for prefixed status logging to stderr.
///
/// Usage:
/// ```ignore
/// log_status!("manifest", "Migrated {} to {}", from, to);
/// log_status!("npm", "Installing: {}", packages.join(" "));
/// ```
#[macro_export]
macro_rules! log_status {
    ($prefix:expr, $($arg:tt)*) => {
        $crate::core::logger::info($prefix, &format!($($arg)*))
    };
}

/// Debug-level logging; shown only with `--debug`.
#[macro_export]
macro_rules! log_debug {
    ($prefix:expr, $($arg:tt)*) => {
        if $crate::core::logger::is_debug() {
            $crate::core::logger::debug($prefix, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_warning {
    ($prefix:expr, $($arg:tt)*) => {
        $crate::core::logger::warning($prefix, &format!($($arg)*))
    };
}

pub mod core;
pub mod utils;

// Re-export everything from core for ergonomic library use
// Users can write `deskthing_template::manifest` instead of `deskthing_template::core::manifest`
pub use core::*;
pub use utils::*;
