//! Heatsite Web - browser viewer
//!
//! Renders the site model into `#viewer-canvas` and wires the page's group
//! labels to the highlight controller.

mod app;
mod dom;

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    // Keep wgpu chatter out of the console
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    app::run();
}
