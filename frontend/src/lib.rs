#![recursion_limit = "256"]

use app::components::App;
use leptos::mount::hydrate_body;
use wasm_bindgen::prelude::wasm_bindgen;

/// Browser entry point. Installs the console logger that `tracing` events
/// from the booking runtime are forwarded to, then hydrates the page.
#[wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    #[allow(clippy::expect_used)]
    console_log::init_with_level(log::Level::Info).expect("error initializing logger");
    log::info!("Hydrating cab booking form");

    hydrate_body(App);
}
