//! Processor bindings.
//!
//! A [`JsProcessor`] is built once (typically when a worker starts) and then
//! handles any number of uploads. Responses and errors cross into JavaScript
//! as plain objects with the same shape as the JSON the CLI prints.
//!
//! # Example
//!
//! ```typescript
//! import init, { JsProcessor } from '@selic/wasm';
//!
//! await init();
//! const processor = new JsProcessor({ preprocess: { sharpness: 1.2 } });
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! try {
//!   const result = processor.process(bytes, file.type);
//!   console.log(result.suggestions.caption);
//! } catch (err) {
//!   console.error(`${err.stage}: ${err.message}`);
//! }
//! ```

use selic_core::api::{
    self, AnalyzeResponse, CompressResponse, ErrorResponse, ImageUpload, ProcessResponse,
};
use selic_core::{PipelineConfig, Processor};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A configured pipeline.
#[wasm_bindgen]
pub struct JsProcessor {
    inner: Processor,
}

impl JsProcessor {
    /// Build from an already deserialized config.
    pub fn from_config(config: PipelineConfig) -> Result<JsProcessor, String> {
        Processor::new(config)
            .map(|inner| JsProcessor { inner })
            .map_err(|e| format!("Invalid config: {}", e))
    }

    pub fn analyze_upload(&self, upload: &ImageUpload) -> Result<AnalyzeResponse, ErrorResponse> {
        api::handle_analyze(&self.inner, upload).map_err(|e| ErrorResponse::from(&e))
    }

    pub fn compress_upload(&self, upload: &ImageUpload) -> Result<CompressResponse, ErrorResponse> {
        api::handle_compress(&self.inner, upload)
            .map(|(response, _)| response)
            .map_err(|e| ErrorResponse::from(&e))
    }

    pub fn process_upload(&self, upload: &ImageUpload) -> Result<ProcessResponse, ErrorResponse> {
        api::handle_process(&self.inner, upload)
            .map(|(response, _)| response)
            .map_err(|e| ErrorResponse::from(&e))
    }
}

#[wasm_bindgen]
impl JsProcessor {
    /// Create a processor.
    ///
    /// # Arguments
    /// * `config` - Partial `PipelineConfig` object, or `undefined` for defaults
    ///
    /// # Errors
    /// Returns an error string for unknown keys or out-of-range values
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsProcessor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            PipelineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        JsProcessor::from_config(config).map_err(|e| JsValue::from_str(&e))
    }

    /// Name of the semantic model in use.
    #[wasm_bindgen(getter, js_name = semanticModel)]
    pub fn semantic_model(&self) -> String {
        self.inner.semantic_model().to_string()
    }

    /// Analyze an upload without encoding it.
    pub fn analyze(&self, bytes: Vec<u8>, content_type: &str) -> Result<JsValue, JsValue> {
        to_js(self.analyze_upload(&ImageUpload::new(content_type, bytes)))
    }

    /// Analyze and compress an upload.
    pub fn compress(&self, bytes: Vec<u8>, content_type: &str) -> Result<JsValue, JsValue> {
        to_js(self.compress_upload(&ImageUpload::new(content_type, bytes)))
    }

    /// Compress an upload and suggest a caption.
    pub fn process(&self, bytes: Vec<u8>, content_type: &str) -> Result<JsValue, JsValue> {
        to_js(self.process_upload(&ImageUpload::new(content_type, bytes)))
    }
}

/// Serialize either side of a result into a JS object.
fn to_js<T: Serialize>(result: Result<T, ErrorResponse>) -> Result<JsValue, JsValue> {
    match result {
        Ok(response) => serialize(&response),
        Err(error) => Err(serialize(&error)?),
    }
}

fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize response: {}", e)))
}
