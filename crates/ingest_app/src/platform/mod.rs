//! Interactive terminal client wiring the pure core to the engine.
mod app;
mod config;
mod effects;
mod input;
mod ui;

pub use app::run_app;
