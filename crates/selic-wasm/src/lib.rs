//! Selic WASM - WebAssembly bindings for Selic
//!
//! This crate exposes the selic-core pipeline to JavaScript/TypeScript,
//! typically from a Web Worker so encoding stays off the main thread.
//!
//! # Module Structure
//!
//! - `processor` - `JsProcessor`, the analyze / compress / process entry points
//! - `logger` - `log` backend writing to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsProcessor, set_log_level } from '@selic/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//! set_log_level('debug');
//!
//! const processor = new JsProcessor();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const analysis = processor.analyze(bytes, file.type);
//! console.log(analysis.compression_settings.format);
//! ```

use wasm_bindgen::prelude::*;

mod logger;
mod processor;

pub use logger::init_logger;
pub use processor::JsProcessor;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    if init_logger(log::LevelFilter::Info) {
        log::debug!("selic-wasm {} ready", version());
    }
}

/// Change the console log level ("off", "error", "warn", "info", "debug", "trace").
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = logger::parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    init_logger(filter);
    log::debug!("log level set to {}", filter);
    Ok(())
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
