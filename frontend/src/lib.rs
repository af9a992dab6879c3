use sauron::prelude::*;

pub mod api;
pub mod app;
pub mod config;
pub mod form;
pub mod project_view;
pub mod task_view;

use crate::app::App;

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_tracing::set_as_global_default();

    let base_url = config::api_base_url();
    tracing::info!(%base_url, "starting task manager frontend");
    Program::mount_to_body(App::new(base_url));
}
