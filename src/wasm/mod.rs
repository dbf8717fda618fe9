//! WASM bindings for the pager

pub mod flat_buffer;

use crate::config::RawOptions;
use crate::document::{DocumentContext, Element};
use crate::error::BridgeError;
use crate::layout::StackMeasure;
use crate::render::FontLeaderMetrics;
use crate::session::{CompilerId, PagedDocument, Registration, Sessions, RUN_PAUSE};
use flat_buffer::PageMapBuffer;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Install the panic hook and route `log` to the browser console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // A second init (module re-instantiated) keeps the first logger
    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_ok() {
        log::info!("book-pager initialized");
    }
}

impl From<BridgeError> for JsValue {
    fn from(error: BridgeError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

/// JSON in, JSON out: the part of the bridge that does not touch JS values
#[derive(Debug, Default)]
pub struct Bridge {
    sessions: Sessions,
    last: Option<PagedDocument>,
    buffer: PageMapBuffer,
    run: u32,
}

fn decode_options(json: &str) -> Result<RawOptions, BridgeError> {
    serde_json::from_str(json).map_err(|e| BridgeError::InvalidOptions(e.to_string()))
}

fn decode_document(json: &str) -> Result<DocumentContext, BridgeError> {
    serde_json::from_str(json).map_err(|e| BridgeError::InvalidDocument(e.to_string()))
}

fn decode_lines(json: &str) -> Result<Vec<Element>, BridgeError> {
    serde_json::from_str(json).map_err(|e| BridgeError::InvalidLines(e.to_string()))
}

/// Milliseconds since the epoch, for run timings
fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, BridgeError> {
    serde_json::to_string(value).map_err(|e| BridgeError::Encode(e.to_string()))
}

impl Bridge {
    pub fn register_page(
        &mut self,
        compiler: u32,
        options_json: &str,
        has_container: bool,
    ) -> Result<Registration, BridgeError> {
        let options = decode_options(options_json)?;
        Ok(self
            .sessions
            .register(CompilerId(compiler.into()), &options, has_container))
    }

    /// Rendered contents block as JSON; an empty element when the compiler
    /// has no page environment
    pub fn contents(
        &mut self,
        compiler: u32,
        options_json: &str,
        document_json: &str,
    ) -> Result<String, BridgeError> {
        let options = decode_options(options_json)?;
        let context = decode_document(document_json)?;
        let element = self
            .sessions
            .contents(CompilerId(compiler.into()), &context, &options);
        encode(&element)
    }

    /// Run every scheduled pagination pass and the paged listeners.
    ///
    /// Returns `Ok(None)` when the compiler has no page environment.
    pub fn paginate(
        &mut self,
        compiler: u32,
        lines_json: &str,
        document_json: &str,
    ) -> Result<Option<&PagedDocument>, BridgeError> {
        let lines = decode_lines(lines_json)?;
        let context = decode_document(document_json)?;
        let Some(env) = self.sessions.get(CompilerId(compiler.into())) else {
            return Ok(None);
        };

        let started = now_ms();
        let document = env.run(&lines, &context, &StackMeasure, &FontLeaderMetrics::default());
        self.run = self.run.wrapping_add(1);
        log::debug!(
            "compiler {} run {}: {} lines onto {} pages in {:.1}ms",
            compiler,
            self.run,
            lines.len(),
            document.pages.len(),
            now_ms() - started
        );
        self.buffer.encode(&document, self.run);
        Ok(Some(&*self.last.insert(document)))
    }

    pub fn last(&self) -> Option<&PagedDocument> {
        self.last.as_ref()
    }

    pub fn buffer(&self) -> &PageMapBuffer {
        &self.buffer
    }

    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    pub fn release(&mut self, compiler: u32) -> bool {
        self.sessions.release(CompilerId(compiler.into())).is_some()
    }
}

/// WASM-exposed pager
#[wasm_bindgen]
pub struct WasmPager {
    bridge: Bridge,
}

#[wasm_bindgen]
impl WasmPager {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            bridge: Bridge::default(),
        }
    }

    /// Register the `page` unit of a compiler.
    /// Returns "registered", "already-active" or "no-container".
    #[wasm_bindgen(js_name = registerPage)]
    pub fn register_page(
        &mut self,
        compiler: u32,
        options_json: &str,
        has_container: bool,
    ) -> Result<String, JsValue> {
        let registration = self
            .bridge
            .register_page(compiler, options_json, has_container)?;
        Ok(match registration {
            Registration::Registered => "registered",
            Registration::AlreadyActive => "already-active",
            Registration::NoContainer => "no-container",
        }
        .to_string())
    }

    /// Render a `contents` unit (returns element JSON)
    pub fn contents(
        &mut self,
        compiler: u32,
        options_json: &str,
        document_json: &str,
    ) -> Result<String, JsValue> {
        Ok(self.bridge.contents(compiler, options_json, document_json)?)
    }

    /// Milliseconds to wait before the first pagination run
    #[wasm_bindgen(js_name = breakDelay)]
    pub fn break_delay(&self, compiler: u32) -> f64 {
        self.bridge
            .sessions()
            .get(CompilerId(compiler.into()))
            .map_or(0.0, |env| env.schedule().delay.as_secs_f64() * 1000.0)
    }

    /// Milliseconds to wait between runs and before the paged listeners
    #[wasm_bindgen(js_name = runPause)]
    pub fn run_pause(&self) -> f64 {
        RUN_PAUSE.as_secs_f64() * 1000.0
    }

    /// Paginate and return the paged document JSON, or `undefined` when the
    /// compiler has no page environment. The page map buffer is refreshed.
    pub fn paginate(
        &mut self,
        compiler: u32,
        lines_json: &str,
        document_json: &str,
    ) -> Result<Option<String>, JsValue> {
        match self.bridge.paginate(compiler, lines_json, document_json)? {
            Some(document) => Ok(Some(encode(document)?)),
            None => Ok(None),
        }
    }

    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.bridge.last().map_or(0, |doc| doc.pages.len())
    }

    /// Print stylesheet of the last run, if any
    #[wasm_bindgen(js_name = getStyle)]
    pub fn get_style(&self) -> Option<String> {
        self.bridge.last().and_then(|doc| doc.style.clone())
    }

    /// Whether the embedding host must be sent an `adjust` event
    #[wasm_bindgen(js_name = needsAdjust)]
    pub fn needs_adjust(&self) -> bool {
        self.bridge.last().map_or(false, |doc| doc.adjust)
    }

    pub fn release(&mut self, compiler: u32) -> bool {
        self.bridge.release(compiler)
    }

    #[wasm_bindgen(js_name = u32Ptr)]
    pub fn u32_ptr(&self) -> u32 {
        self.bridge.buffer().u32_ptr()
    }

    #[wasm_bindgen(js_name = u32Len)]
    pub fn u32_len(&self) -> u32 {
        self.bridge.buffer().u32_len()
    }

    #[wasm_bindgen(js_name = f32Ptr)]
    pub fn f32_ptr(&self) -> u32 {
        self.bridge.buffer().f32_ptr()
    }

    #[wasm_bindgen(js_name = f32Len)]
    pub fn f32_len(&self) -> u32 {
        self.bridge.buffer().f32_len()
    }

    #[wasm_bindgen(js_name = textPtr)]
    pub fn text_ptr(&self) -> u32 {
        self.bridge.buffer().text_ptr()
    }

    #[wasm_bindgen(js_name = textLen)]
    pub fn text_len(&self) -> u32 {
        self.bridge.buffer().text_len()
    }
}

impl Default for WasmPager {
    fn default() -> Self {
        Self::new()
    }
}
