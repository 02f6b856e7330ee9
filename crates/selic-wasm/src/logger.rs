//! `log` backend that writes to the browser console.
//!
//! Records at `error` and `warn` go to `console.error` / `console.warn`,
//! everything else to `console.log`.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record.level(), record.target(), &record.args().to_string());
        write_console(record.level(), &line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        _ => web_sys::console::log_1(&value),
    }
}

// The console bindings only exist in a JS host.
#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, line: &str) {
    eprintln!("{line}");
}

/// `[LEVEL target] message`
pub(crate) fn format_record(level: Level, target: &str, message: &str) -> String {
    format!("[{level} {target}] {message}")
}

/// Install the console logger. Later calls only change the level.
///
/// Returns `false` when a logger was already installed.
pub fn init_logger(level: LevelFilter) -> bool {
    let installed = match log::set_logger(&LOGGER) {
        Ok(()) => true,
        Err(err) => {
            log::debug!("console logger not installed again ({err}); updating level only");
            false
        }
    };
    log::set_max_level(level);
    installed
}

/// Parse a level name ("error" … "trace", or "off").
pub(crate) fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}
