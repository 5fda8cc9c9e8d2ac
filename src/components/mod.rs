pub mod app;
pub mod controls_panel;
pub mod instrument_view;
pub mod session_over_overlay;
pub mod status_panel;
