mod color;
mod components;
mod config;
mod error;
mod geometry;
mod input;
mod midi;
mod model;
mod panels;
mod render;
mod state;
mod surface;
mod util;
mod web_midi;

use components::app::App;

fn main() {
    let query = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    util::init_logging(util::level_from_query(&query));
    log::info!("starting {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    yew::Renderer::<App>::new().render();
}
