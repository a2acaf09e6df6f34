//! Leveled stderr logging with an optional progress spinner.
//!
//! stdout carries the JSON response envelope, so everything here goes to
//! stderr. Configuration is process-global and safe to use from the
//! reconciler's worker threads.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

static DEBUG: AtomicBool = AtomicBool::new(false);
static SILENT: AtomicBool = AtomicBool::new(false);
static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerConfig {
    pub debug: bool,
    pub silent: bool,
}

pub fn configure(config: LoggerConfig) {
    DEBUG.store(config.debug, Ordering::Relaxed);
    SILENT.store(config.silent, Ordering::Relaxed);
}

pub fn is_debug() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

pub fn is_silent() -> bool {
    SILENT.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

fn enabled(level: Level) -> bool {
    match level {
        Level::Error => true,
        Level::Debug => is_debug() && !is_silent(),
        _ => !is_silent(),
    }
}

fn render(level: Level, prefix: &str, message: &str) -> String {
    let tag = format!("[{}]", prefix);
    match level {
        Level::Debug => format!("{} {}", style(tag).dim(), style(message).dim()),
        Level::Info => format!("{} {}", style(tag).cyan(), message),
        Level::Success => format!("{} {}", style(tag).green(), style(message).green()),
        Level::Warning => format!("{} {}", style(tag).yellow(), style(message).yellow()),
        Level::Error => format!("{} {}", style(tag).red().bold(), style(message).red()),
    }
}

fn emit(level: Level, prefix: &str, message: &str) {
    if !enabled(level) {
        return;
    }

    let line = render(level, prefix, message);
    let guard = SPINNER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    match guard.as_ref() {
        Some(spinner) => spinner.suspend(|| eprintln!("{}", line)),
        None => eprintln!("{}", line),
    }
}

pub fn debug(prefix: &str, message: &str) {
    emit(Level::Debug, prefix, message);
}

pub fn info(prefix: &str, message: &str) {
    emit(Level::Info, prefix, message);
}

pub fn success(prefix: &str, message: &str) {
    emit(Level::Success, prefix, message);
}

pub fn warning(prefix: &str, message: &str) {
    emit(Level::Warning, prefix, message);
}

pub fn error(prefix: &str, message: &str) {
    emit(Level::Error, prefix, message);
}

/// Start an indeterminate spinner, replacing any spinner already running.
pub fn start_progress(message: &str) {
    if is_silent() {
        return;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut guard = SPINNER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(previous) = guard.replace(spinner) {
        previous.finish_and_clear();
    }
}

/// Stop the running spinner, leaving a ✔/✘ line behind.
pub fn stop_progress(succeeded: bool) {
    let mut guard = SPINNER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(spinner) = guard.take() {
        let message = spinner.message();
        if succeeded {
            spinner.finish_with_message(format!("{} {}", style("✔").green(), message));
        } else {
            spinner.finish_with_message(format!("{} {}", style("✘").red(), message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_level_ignores_silent() {
        assert!(enabled(Level::Error));
    }

    #[test]
    fn render_keeps_prefix_and_message() {
        let line = render(Level::Info, "update", "Migrating manifest");
        assert!(line.contains("[update]"));
        assert!(line.contains("Migrating manifest"));
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        stop_progress(true);
        stop_progress(false);
    }
}
